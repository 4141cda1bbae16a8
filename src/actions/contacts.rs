use super::ActionContext;
use crate::models::endpoints::public;
use crate::models::response::ActionResponse;
use crate::models::Record;
use crate::services::adapter::resolve;
use crate::services::http_client::Payload;
use crate::services::render_cache::CacheTag;
use tracing::info;

pub async fn submit_contact(ctx: &ActionContext, payload: Payload) -> ActionResponse<Record> {
    let response = resolve(
        ctx.public().post(&public::CONTACT.general(), payload).await,
        "Failed to send message",
    );

    if response.is_success() {
        info!("contact message submitted");
        ctx.revalidate(&[CacheTag::CONTACTS]);
    }
    response
}
