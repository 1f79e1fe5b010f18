use super::context::Context;
use super::print_json;
use anyhow::Result;
use clap::Args;
use roster_core::query::{PaginationInfo, Query, QueryPatch, SortDirection};
use roster_core::user::{User, UserStatus};
use serde::Serialize;

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Page number, starting at 1
    #[arg(long)]
    pub page: Option<u32>,
    /// Records per page
    #[arg(long)]
    pub page_size: Option<u32>,
    /// Case-insensitive match on name or email
    #[arg(long)]
    pub search: Option<String>,
    /// Only users with this role
    #[arg(long)]
    pub role: Option<String>,
    /// Only users with this status
    #[arg(long)]
    pub status: Option<UserStatus>,
    /// Field to sort by
    #[arg(long)]
    pub sort: Option<String>,
    /// Sort descending
    #[arg(long)]
    pub desc: bool,
}

#[derive(Serialize)]
struct ListOutput {
    items: Vec<User>,
    pagination: PaginationInfo,
}

impl ListArgs {
    /// Applies the arguments on top of `base`.
    pub fn to_query(&self, base: Query) -> Result<Query> {
        let mut filters = Vec::new();
        if let Some(role) = &self.role {
            filters.push(("role", role.clone()));
        }
        if let Some(status) = self.status {
            filters.push(("status", status.to_string()));
        }

        let mut query = base;
        query.merge(&QueryPatch {
            page_size: self.page_size,
            search: self.search.clone(),
            filters: (!filters.is_empty())
                .then(|| filters.into_iter().map(|(k, v)| (k.to_string(), v)).collect()),
            ..QueryPatch::default()
        })?;
        // Page last: the merge above resets it
        if let Some(page) = self.page {
            query.merge(&QueryPatch::page(page))?;
        }
        if let Some(sort) = &self.sort {
            query.sort_field = sort.clone();
        }
        query.sort_direction = if self.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        Ok(query)
    }
}

pub async fn run(context: &Context, args: ListArgs) -> Result<()> {
    let query = args.to_query(context.initial_query())?;
    let store = context.store(query);
    store.refresh().await?;

    print_json(&ListOutput {
        items: store.snapshot().await.items,
        pagination: store.pagination().await,
    })
}
