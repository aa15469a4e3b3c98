//! Renderers for the results the demo programs print.
use std::time::Duration;

use dify_client::api_v1::{ChatMessageResponse, RetrieveResponse};
use dify_core::event::StreamEvent;
use dify_core::metadata::{RetrieverResource, Usage};
use dify_core::Accumulator;

use crate::builder::{MISSING, ReportBuilder, preview};

const RESOURCE_PREVIEW_CHARS: usize = 100;
const SEGMENT_PREVIEW_CHARS: usize = 200;

/// Full report of a blocking chat response.
pub fn render_chat_response(response: &ChatMessageResponse) -> String {
    let mut report = ReportBuilder::new()
        .add_key_value_opt("Event", response.event.as_deref())
        .add_key_value_opt("Task ID", response.task_id.as_deref())
        .add_key_value_opt("Message ID", response.message_id.as_deref())
        .add_key_value_opt("Conversation ID", response.conversation_id.as_deref())
        .add_key_value_opt("Mode", response.mode.as_deref())
        .add_rule()
        .add_blank_line()
        .add_heading("Answer")
        .add_line(&response.answer)
        .add_blank_line();

    if let Some(usage) = &response.metadata.usage {
        report = add_usage(report.add_rule(), usage, true);
    }
    report = add_resources(report, &response.metadata.retriever_resources);

    report.add_rule().finalize()
}

/// Summary printed once a stream has been folded.
pub fn render_stream_summary(acc: &Accumulator, elapsed: Duration) -> String {
    let mut report = ReportBuilder::new()
        .add_rule()
        .add_key_value_opt("Task ID", acc.task_id.as_deref())
        .add_key_value_opt("Message ID", acc.message_id.as_deref())
        .add_key_value_opt("Conversation ID", acc.conversation_id.as_deref())
        .add_key_value("Elapsed", format_args!("{:.2}s", elapsed.as_secs_f64()));

    if let Some(failure) = &acc.error {
        report = report.add_key_value("Error", &failure.message);
        if let Some(code) = &failure.code {
            report = report.add_key_value("Error code", code);
        }
    }

    if let Some(metadata) = &acc.metadata {
        if let Some(usage) = &metadata.usage {
            report = add_usage(report.add_rule(), usage, false);
        }
        report = add_resources(report, &metadata.retriever_resources);
    }

    report.add_rule().finalize()
}

/// One progress line for events that do not carry answer text.
///
/// Returns `None` for `message` chunks, `message_end` and `ping`.
pub fn describe_event(event: &StreamEvent) -> Option<String> {
    match event {
        StreamEvent::WorkflowStarted {
            workflow_run_id, ..
        } => Some(format!(
            "[workflow started] run id: {}",
            or_missing(workflow_run_id.as_deref())
        )),
        StreamEvent::NodeStarted { data, .. } => Some(format!(
            "[node started] {} ({})",
            or_missing(data.title.as_deref()),
            or_missing(data.node_type.as_deref())
        )),
        StreamEvent::NodeFinished { data, .. } => Some(format!(
            "[node finished] {} - status: {}",
            or_missing(data.title.as_deref()),
            or_missing(data.status.as_deref())
        )),
        StreamEvent::WorkflowFinished { data, .. } => Some(format!(
            "[workflow finished] status: {}",
            or_missing(data.status.as_deref())
        )),
        StreamEvent::MessageFile { file_type, url, .. } => Some(format!(
            "[file] type: {}, url: {}",
            or_missing(file_type.as_deref()),
            or_missing(url.as_deref())
        )),
        StreamEvent::MessageReplace { answer, .. } => Some(format!("[message replaced] {answer}")),
        StreamEvent::Error { message, .. } => Some(format!(
            "[error] {}",
            or_missing(message.as_deref())
        )),
        StreamEvent::Message { .. } | StreamEvent::MessageEnd { .. } | StreamEvent::Ping => None,
    }
}

/// Report of a knowledge retrieval.
pub fn render_retrieval(response: &RetrieveResponse) -> String {
    let mut report = ReportBuilder::new()
        .add_key_value("Query", &response.query.content)
        .add_key_value("Records", response.records.len())
        .add_banner("Results");

    for (idx, record) in response.records.iter().enumerate() {
        let segment = &record.segment;
        report = report
            .add_blank_line()
            .add_heading(format_args!("Result {}", idx + 1))
            .add_key_value_opt("Score", record.score.map(|s| format!("{s:.4}")))
            .add_key_value_opt("Segment ID", segment.id.as_deref())
            .add_key_value_opt("Document ID", segment.document_id.as_deref())
            .add_key_value_opt("Position", segment.position)
            .add_key_value_opt("Word count", segment.word_count)
            .add_key_value_opt("Tokens", segment.tokens);

        if let Some(document) = &segment.document {
            report = report
                .add_line("Document:")
                .add_item(format_args!("name: {}", or_missing(document.name.as_deref())))
                .add_item(format_args!(
                    "data source: {}",
                    or_missing(document.data_source_type.as_deref())
                ));
        }

        report = report.add_preview("Content", &segment.content, SEGMENT_PREVIEW_CHARS);

        if !segment.keywords.is_empty() {
            report = report.add_key_value("Keywords", segment.keywords.join(", "));
        }

        report = report.add_rule();
    }

    report.finalize()
}

fn add_usage(report: ReportBuilder, usage: &Usage, with_split_prices: bool) -> ReportBuilder {
    let currency = usage.currency_or_default();
    let mut report = report
        .add_line("Token usage:")
        .add_item(format_args!("prompt tokens: {}", usage.prompt_tokens))
        .add_item(format_args!("completion tokens: {}", usage.completion_tokens))
        .add_item(format_args!("total tokens: {}", usage.total_tokens));

    if with_split_prices {
        report = report
            .add_item(format_args!(
                "prompt price: {} {currency}",
                usage.prompt_price.unwrap_or_default()
            ))
            .add_item(format_args!(
                "completion price: {} {currency}",
                usage.completion_price.unwrap_or_default()
            ));
    }

    report
        .add_item(format_args!(
            "total price: {} {currency}",
            usage.total_price.unwrap_or_default()
        ))
        .add_item(format_args!(
            "latency: {:.2}s",
            usage.latency.unwrap_or_default()
        ))
}

fn add_resources(report: ReportBuilder, resources: &[RetrieverResource]) -> ReportBuilder {
    if resources.is_empty() {
        return report;
    }

    let mut report = report
        .add_blank_line()
        .add_key_value("Cited resources", resources.len());

    for (idx, resource) in resources.iter().enumerate() {
        report = report
            .add_blank_line()
            .add_heading(format_args!("Resource {}", idx + 1))
            .add_item(format_args!("position: {}", or_missing_display(resource.position)))
            .add_item(format_args!(
                "dataset: {}",
                or_missing(resource.dataset_name.as_deref())
            ))
            .add_item(format_args!(
                "document: {}",
                or_missing(resource.document_name.as_deref())
            ))
            .add_item(format_args!(
                "score: {:.4}",
                resource.score.unwrap_or_default()
            ));

        if let Some(content) = &resource.content {
            report = report.add_item(format_args!(
                "content: {}",
                preview(content, RESOURCE_PREVIEW_CHARS)
            ));
        }
    }

    report
}

fn or_missing(value: Option<&str>) -> &str {
    value.unwrap_or(MISSING)
}

fn or_missing_display<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| MISSING.to_owned(), |v| v.to_string())
}
