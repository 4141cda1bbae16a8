use super::ActionContext;
use crate::models::endpoints::public;
use crate::models::response::ActionResponse;
use crate::models::Record;
use crate::services::adapter::resolve;
use crate::services::render_cache::CacheTag;

pub async fn get_config_by_key(ctx: &ActionContext, key: &str) -> ActionResponse<Record> {
    let path = public::config_by_key(key);
    let client = ctx.anonymous();
    ctx.render_cache()
        .get_or_fetch(&path, &[CacheTag::CONFIGS], || async {
            resolve(client.get(&path).await, "Failed to fetch config")
        })
        .await
}
