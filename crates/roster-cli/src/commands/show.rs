use super::context::Context;
use super::print_json;
use anyhow::Result;

pub async fn run(context: &Context, id: &str) -> Result<()> {
    let store = context.store(context.initial_query());
    let user = store.get_by_id(id).await?;
    print_json(&user)
}
