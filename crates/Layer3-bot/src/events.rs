//! 내장 이벤트 핸들러 - 길드 레코드 관리
//!
//! | 이벤트         | 페이로드                 | 동작                          |
//! |----------------|--------------------------|-------------------------------|
//! | `guild_create` | `{"id": "..."}`          | 중복 삭제 후 레코드 하나 추가 |
//! | `guild_delete` | `{"id": "..."}`          | 해당 길드 레코드 전부 삭제    |
//! | `ready`        | `{"guilds": ["..", ..]}` | 누락된 길드만 추가            |

use anyhow::Context;
use pinboard_core::{event_fn, EventTable};
use pinboard_foundation::{channels, GuildStore};
use serde_json::Value;
use tracing::{debug, info};

fn guild_id(payload: &Value) -> anyhow::Result<String> {
    payload
        .get("id")
        .and_then(Value::as_str)
        .map(String::from)
        .context("payload has no guild id")
}

/// 길드 저장소를 사용하는 핸들러 테이블
pub fn event_table(store: GuildStore) -> EventTable {
    let on_create = store.clone();
    let on_delete = store.clone();
    let on_ready = store;

    EventTable::new()
        .with(
            "guild_create",
            event_fn(move |payload| {
                let store = on_create.clone();
                async move {
                    let id = guild_id(&payload)?;
                    store.replace(&id)?;
                    debug!(target: channels::EVENTS, "Joined guild {}", id);
                    anyhow::Ok(())
                }
            }),
        )
        .with(
            "guild_delete",
            event_fn(move |payload| {
                let store = on_delete.clone();
                async move {
                    let id = guild_id(&payload)?;
                    let removed = store.delete_all(&id)?;
                    debug!(target: channels::EVENTS, "Left guild {} ({} record(s))", id, removed);
                    anyhow::Ok(())
                }
            }),
        )
        .with(
            "ready",
            event_fn(move |payload| {
                let store = on_ready.clone();
                async move {
                    let guilds: Vec<&str> = payload
                        .get("guilds")
                        .and_then(Value::as_array)
                        .map(|ids| ids.iter().filter_map(Value::as_str).collect())
                        .unwrap_or_default();

                    let added = store.ensure_all(guilds)?;
                    if added > 0 {
                        info!(
                            target: channels::EVENTS,
                            "Added {} missing guild(s) to the database",
                            added
                        );
                    }
                    anyhow::Ok(())
                }
            }),
        )
}
