use std::sync::Arc;

use crate::error::SearchError;
use crate::models::{RankingPreferences, SearchResult};
use crate::utils::{isolated, sanitize_query};

use super::SearchMethodRegistry;

/// Routes an inbound query to the requested provider / 搜索分发器
#[derive(Clone)]
pub struct SearchDispatcher {
    registry: Arc<SearchMethodRegistry>,
}

impl SearchDispatcher {
    pub fn new(registry: Arc<SearchMethodRegistry>) -> Self {
        Self { registry }
    }

    /// Validate, look up and invoke a provider / 校验、查找并调用搜索方法
    ///
    /// The provider's result is returned verbatim. A provider failure (error
    /// or panic) becomes a `SearchResult` carrying `error`, never an `Err`.
    pub async fn dispatch(
        &self,
        method_key: &str,
        query: &str,
        prefs: &RankingPreferences,
    ) -> Result<SearchResult, SearchError> {
        let query = sanitize_query(query)?;
        let method = self
            .registry
            .get(method_key)
            .ok_or_else(|| SearchError::UnknownMethod(method_key.to_string()))?;

        tracing::debug!("Dispatching query {:?} to method {}", query, method_key);
        match isolated(method.search(&query, prefs)).await {
            Ok(result) => Ok(result),
            Err(e) => {
                tracing::warn!("Search method {} failed: {}", method_key, e);
                Ok(SearchResult::failed(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::island::IslandRegistry;
    use crate::test_utils::ScriptedMethod;
    use std::sync::atomic::Ordering;

    fn dispatcher(spy: Arc<ScriptedMethod>) -> SearchDispatcher {
        let mut registry = SearchMethodRegistry::new(Arc::new(IslandRegistry::new()));
        registry.register(spy).unwrap();
        SearchDispatcher::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let spy = ScriptedMethod::basic("text");
        let dispatcher = dispatcher(spy.clone());

        let err = dispatcher.dispatch("nope", "rust", &RankingPreferences::new()).await.unwrap_err();
        assert_eq!(err, SearchError::UnknownMethod("nope".into()));
        assert_eq!(spy.search_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_query_never_reaches_provider() {
        let spy = ScriptedMethod::basic("text");
        let dispatcher = dispatcher(spy.clone());

        for query in ["", "   ", "\0"] {
            let err = dispatcher.dispatch("text", query, &RankingPreferences::new()).await.unwrap_err();
            assert_eq!(err.kind(), "validation_error");
        }
        assert_eq!(spy.search_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_result_returned_verbatim() {
        let spy = ScriptedMethod::basic("text");
        let dispatcher = dispatcher(spy.clone());

        let result = dispatcher.dispatch("text", "  rust\0 ", &RankingPreferences::new()).await.unwrap();
        assert_eq!(result, SearchResult::new(vec![ScriptedMethod::answer("rust")]));
        assert_eq!(spy.search_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_becomes_result_error() {
        let dispatcher = dispatcher(ScriptedMethod::basic("text"));

        let result = dispatcher.dispatch("text", "explode", &RankingPreferences::new()).await.unwrap();
        assert!(result.answers.is_empty());
        assert_eq!(result.error.as_deref(), Some("provider exploded"));
    }
}
