use super::ActionContext;
use crate::models::endpoints::public;
use crate::models::response::ActionResponse;
use crate::models::Record;
use crate::services::adapter::resolve;
use crate::services::render_cache::CacheTag;

pub async fn get_post_by_slug(ctx: &ActionContext, slug: &str) -> ActionResponse<Record> {
    let path = public::post_by_slug(slug);
    let client = ctx.anonymous();
    ctx.render_cache()
        .get_or_fetch(&path, &[CacheTag::POSTS, CacheTag::post(slug)], || async {
            resolve(client.get(&path).await, "Failed to fetch post")
        })
        .await
}
