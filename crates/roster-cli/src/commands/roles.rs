use super::context::Context;
use super::print_json;
use anyhow::Result;

pub async fn run(context: &Context) -> Result<()> {
    let roles = context.api.list_roles().await?;
    print_json(&roles)
}
