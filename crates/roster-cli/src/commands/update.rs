use super::context::Context;
use super::print_json;
use anyhow::{Result, bail};
use clap::Args;
use roster_core::user::{UserPatch, UserStatus};

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// User id
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub role: Option<String>,
    #[arg(long)]
    pub status: Option<UserStatus>,
    #[arg(long)]
    pub department: Option<String>,
}

impl UpdateArgs {
    pub fn patch(&self) -> UserPatch {
        UserPatch {
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
            status: self.status,
            department: self.department.clone(),
            ..UserPatch::default()
        }
    }
}

pub async fn run(context: &Context, args: UpdateArgs) -> Result<()> {
    let patch = args.patch();
    if patch.is_empty() {
        bail!("Nothing to update for {}", args.id);
    }

    let store = context.store(context.initial_query());
    let updated = store.update(&args.id, patch).await?;
    print_json(&updated)
}
