use serde::{Serialize, de::DeserializeOwned};
use worker::{Cache, Response};

use crate::error::ApiError;

fn cache_url(key: &str) -> String {
    format!("https://timetable-cache.local/{}", urlencoding::encode(key))
}

pub async fn read_json<T>(key: &str) -> Result<Option<T>, ApiError>
where
    T: DeserializeOwned,
{
    let cache = Cache::default();
    let Some(mut response) = cache.get(cache_url(key), true).await? else {
        return Ok(None);
    };

    let body = response.text().await?;
    match serde_json::from_str::<T>(&body) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(error) => {
            worker::console_error!("dropping unreadable cache entry {key}: {error}");
            cache.delete(cache_url(key), true).await?;
            Ok(None)
        }
    }
}

pub async fn write_json<T>(key: &str, value: &T, ttl_seconds: u32) -> Result<(), ApiError>
where
    T: Serialize,
{
    let cache = Cache::default();
    let body = serde_json::to_string(value)?;

    let mut response = Response::ok(body)?;
    response
        .headers_mut()
        .set("Cache-Control", &format!("public, max-age={ttl_seconds}"))?;
    response
        .headers_mut()
        .set("Content-Type", "application/json; charset=utf-8")?;

    cache.put(cache_url(key), response).await?;
    Ok(())
}
