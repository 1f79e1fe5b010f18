use super::context::Context;
use anyhow::Result;

pub async fn run(context: &Context, id: &str) -> Result<()> {
    let store = context.store(context.initial_query());
    store.delete(id).await?;
    println!("Deleted {}", id);
    Ok(())
}

pub async fn run_bulk(context: &Context, ids: &[String]) -> Result<()> {
    let store = context.store_selecting(ids).await?;
    let count = store.selection().await.len();
    store.bulk_delete().await?;
    println!("Deleted {} users", count);
    Ok(())
}
