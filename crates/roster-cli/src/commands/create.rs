use super::context::Context;
use super::print_json;
use anyhow::Result;
use chrono::Local;
use clap::Args;
use roster_core::user::{NewUser, UserStatus};

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    /// Role id (see `roster roles`)
    #[arg(long, default_value = "viewer")]
    pub role: String,
    #[arg(long, default_value = "active")]
    pub status: UserStatus,
    #[arg(long, default_value = "Engineering")]
    pub department: String,
    /// Avatar URL
    #[arg(long)]
    pub avatar: Option<String>,
}

impl CreateArgs {
    pub fn into_draft(self) -> NewUser {
        let today = Local::now().date_naive();
        NewUser {
            name: self.name,
            email: self.email,
            role: self.role,
            status: self.status,
            department: self.department,
            date_joined: today,
            last_login: today,
            avatar: self.avatar,
        }
    }
}

pub async fn run(context: &Context, args: CreateArgs) -> Result<()> {
    let store = context.store(context.initial_query());
    let created = store.create(args.into_draft()).await?;
    print_json(&created)
}
