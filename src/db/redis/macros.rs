/// Read-through caching for provider calls.
///
/// Returns the cached value when there is one. Otherwise runs `$block`, hands
/// the result to the background writer and returns it. A failing cache read
/// is logged and treated as a miss, so the cache can never fail the call it
/// wraps; errors from `$block` itself are propagated with `?`.
///
/// # Arguments
/// * `$cache`: a [`Cache`](crate::db::Cache).
/// * `$key`: the [`CacheKey`](crate::db::CacheKey) to read and write.
/// * `$ttl`: time-to-live for a freshly computed value, in seconds.
/// * `$block`: future computing the value on a miss.
///
/// # Example
/// ```rust,ignore
/// let record = cached!(self.cache, CacheKey::Enrichment(title.to_string()), TTL, async move {
///     self.fetch(title).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        match $cache.get_from_cache(&$key).await {
            Ok(Some(cached)) => {
                tracing::debug!(key = %$key, "Cache hit");
                Ok(cached)
            }
            outcome => {
                if let Err(e) = outcome {
                    tracing::warn!(key = %$key, error = %e, "Cache read failed, treating as miss");
                }
                let value = $block.await?;
                $cache.set_in_background(&$key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
