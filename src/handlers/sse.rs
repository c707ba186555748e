use std::convert::Infallible;

use actix_web::web::Bytes;
use futures_util::stream::{self, Stream};
use serde::Serialize;
use tokio::sync::watch;

/// Render a watch channel as a server-sent-events body: one `data:` frame
/// for the current snapshot, then one per change. The stream ends when
/// the publishing side goes away; dropping it tears down the
/// subscription task upstream.
pub fn watch_events<T>(rx: watch::Receiver<T>) -> impl Stream<Item = Result<Bytes, Infallible>>
where
    T: Serialize + 'static,
{
    stream::unfold((rx, true), |(mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let frame = {
            let snapshot = rx.borrow_and_update();
            match serde_json::to_string(&*snapshot) {
                Ok(json) => format!("data: {}\n\n", json),
                Err(e) => {
                    log::error!("Dropping event stream, snapshot failed to serialize: {}", e);
                    return None;
                }
            }
        };
        Some((Ok(Bytes::from(frame)), (rx, false)))
    })
}
