//! # Knowledge Retrieval
//!
//! Queries a dataset with one of several retrieval configurations.
//!
//! ```bash
//! export DIFY_API_KEY=dataset-…   # mandatory, a dataset API key
//! export DIFY_DATASET_ID=ff09e8db-…
//! cargo run -p dify --example knowledge_retrieve -- hybrid "machine learning algorithms"
//! ```
//!
//! Modes: `basic` (default), `hybrid`, `semantic`, `full-text`, `filtered`.
use dify::client::DifyClientBuilder;
use dify::client::api_v1::{
    MetadataCondition, MetadataFilter, RerankingModel, RetrievalModel, RetrieveRequest,
    SearchMethod,
};
use dify::report::{ReportBuilder, render_retrieval};
use tracing_subscriber::EnvFilter;

fn retrieval_model(mode: &str) -> anyhow::Result<Option<RetrievalModel>> {
    let model = match mode {
        "basic" => None,
        "hybrid" => Some(
            RetrievalModel::new(SearchMethod::HybridSearch)
                .reranking_enable(true)
                .reranking_mode(RerankingModel::new("cohere", "rerank-multilingual-v2.0"))
                .top_k(5u32)
                .score_threshold_enabled(true)
                .score_threshold(0.5)
                .weights(0.7),
        ),
        "semantic" => Some(RetrievalModel::new(SearchMethod::SemanticSearch).top_k(3u32)),
        "full-text" => Some(RetrievalModel::new(SearchMethod::FullTextSearch).top_k(3u32)),
        "filtered" => Some(
            RetrievalModel::new(SearchMethod::HybridSearch)
                .top_k(5u32)
                .metadata_filtering_conditions(MetadataFilter::all(vec![
                    MetadataCondition::new("category", "equals", "AI"),
                ])),
        ),
        other => anyhow::bail!("unknown mode `{other}`"),
    };
    Ok(model)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let mode = args.next().unwrap_or_else(|| "basic".to_owned());
    let query = args
        .next()
        .unwrap_or_else(|| "What is artificial intelligence?".to_owned());

    let dataset_id = std::env::var("DIFY_DATASET_ID")
        .map_err(|_| anyhow::anyhow!("missing env variable: `DIFY_DATASET_ID`"))?;
    let client = DifyClientBuilder::new_from_env().build()?;

    let mut request = RetrieveRequest::new(query);
    request.retrieval_model = retrieval_model(&mode)?;

    print!(
        "{}",
        ReportBuilder::new()
            .add_banner(format_args!("Knowledge retrieval – {mode}"))
            .add_key_value("API base URL", client.base_url())
            .add_key_value("Dataset ID", &dataset_id)
            .add_key_value("Request", serde_json::to_string_pretty(&request)?)
            .add_rule()
            .finalize()
    );

    let response = client.retrieve(&dataset_id, &request).await?;
    print!("{}", render_retrieval(&response));
    Ok(())
}
