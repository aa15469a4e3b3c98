use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::impl_optional_setters;

/// Body of `POST /datasets/{dataset_id}/retrieve`.
#[derive(Debug, Clone, Serialize)]
pub struct RetrieveRequest {
    pub query: String,
    /// Server-side defaults of the dataset apply when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieval_model: Option<RetrievalModel>,
}

impl RetrieveRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            retrieval_model: None,
        }
    }
}

impl_optional_setters!(RetrieveRequest, retrieval_model: RetrievalModel);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
    KeywordSearch,
    SemanticSearch,
    FullTextSearch,
    HybridSearch,
}

/// Retrieval tuning. Only `search_method` is mandatory.
///
/// ```rust
/// use dify_client::api_v1::{RerankingModel, RetrievalModel, SearchMethod};
///
/// let model = RetrievalModel::new(SearchMethod::HybridSearch)
///     .reranking_enable(true)
///     .reranking_mode(RerankingModel::new("cohere", "rerank-multilingual-v2.0"))
///     .top_k(5u32)
///     .score_threshold_enabled(true)
///     .score_threshold(0.5)
///     .weights(0.7);
/// assert_eq!(model.top_k, Some(5));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalModel {
    pub search_method: SearchMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reranking_enable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reranking_mode: Option<RerankingModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_threshold_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<f64>,
    /// Weight of semantic search in hybrid mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_filtering_conditions: Option<MetadataFilter>,
}

impl RetrievalModel {
    pub fn new(search_method: SearchMethod) -> Self {
        Self {
            search_method,
            reranking_enable: None,
            reranking_mode: None,
            top_k: None,
            score_threshold_enabled: None,
            score_threshold: None,
            weights: None,
            metadata_filtering_conditions: None,
        }
    }
}

impl_optional_setters!(
    RetrievalModel,
    reranking_enable: bool,
    reranking_mode: RerankingModel,
    top_k: u32,
    score_threshold_enabled: bool,
    score_threshold: f64,
    weights: f64,
    metadata_filtering_conditions: MetadataFilter,
);

#[derive(Debug, Clone, Serialize)]
pub struct RerankingModel {
    pub reranking_provider_name: String,
    pub reranking_model_name: String,
}

impl RerankingModel {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            reranking_provider_name: provider.into(),
            reranking_model_name: model.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetadataFilter {
    pub logical_operator: LogicalOperator,
    pub conditions: Vec<MetadataCondition>,
}

impl MetadataFilter {
    pub fn all(conditions: Vec<MetadataCondition>) -> Self {
        Self {
            logical_operator: LogicalOperator::And,
            conditions,
        }
    }

    pub fn any(conditions: Vec<MetadataCondition>) -> Self {
        Self {
            logical_operator: LogicalOperator::Or,
            conditions,
        }
    }
}

/// One metadata predicate, e.g. `category equals "AI"`.
///
/// The operator is passed through verbatim (`equals`, `contains`, `>`, …).
#[derive(Debug, Clone, Serialize)]
pub struct MetadataCondition {
    pub name: String,
    pub comparison_operator: String,
    pub value: Value,
}

impl MetadataCondition {
    pub fn new(
        name: impl Into<String>,
        comparison_operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            name: name.into(),
            comparison_operator: comparison_operator.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetrieveResponse {
    #[serde(default)]
    pub query: QueryContent,
    #[serde(default)]
    pub records: Vec<RetrievalRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryContent {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetrievalRecord {
    #[serde(default)]
    pub segment: Segment,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Segment {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub word_count: Option<u64>,
    #[serde(default)]
    pub tokens: Option<u64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub document: Option<DocumentRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub data_source_type: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_request_only_sends_query() {
        let body = serde_json::to_value(RetrieveRequest::new("What is generative UI?")).unwrap();
        assert_eq!(body, json!({ "query": "What is generative UI?" }));
    }

    #[test]
    fn hybrid_request_with_metadata_filter() {
        let request = RetrieveRequest::new("natural language processing").retrieval_model(
            RetrievalModel::new(SearchMethod::HybridSearch)
                .top_k(5u32)
                .metadata_filtering_conditions(MetadataFilter::all(vec![
                    MetadataCondition::new("category", "equals", "AI"),
                ])),
        );

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "query": "natural language processing",
                "retrieval_model": {
                    "search_method": "hybrid_search",
                    "top_k": 5,
                    "metadata_filtering_conditions": {
                        "logical_operator": "and",
                        "conditions": [
                            { "name": "category", "comparison_operator": "equals", "value": "AI" }
                        ]
                    }
                }
            })
        );
    }

    #[test]
    fn response_decodes_with_sparse_segments() {
        let response: RetrieveResponse = serde_json::from_value(json!({
            "query": { "content": "machine learning" },
            "records": [
                {
                    "segment": {
                        "id": "7fa6f24f",
                        "position": 1,
                        "document_id": "a8c6c36f",
                        "content": "Machine learning is a field of study...",
                        "word_count": 847,
                        "tokens": 280,
                        "keywords": ["machine", "learning"],
                        "document": {
                            "id": "a8c6c36f",
                            "data_source_type": "upload_file",
                            "name": "ml.pdf"
                        }
                    },
                    "score": 3.730463140527718e-05
                },
                {
                    "segment": { "content": "short", "keywords": null },
                    "score": null
                }
            ]
        }))
        .unwrap();

        assert_eq!(response.query.content, "machine learning");
        assert_eq!(response.records.len(), 2);

        let first = &response.records[0];
        assert_eq!(first.segment.keywords, ["machine", "learning"]);
        assert_eq!(
            first.segment.document.as_ref().unwrap().name.as_deref(),
            Some("ml.pdf")
        );

        let second = &response.records[1];
        assert!(second.segment.keywords.is_empty());
        assert!(second.score.is_none());
    }
}
