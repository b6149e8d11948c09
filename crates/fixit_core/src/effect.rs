use crate::RequestId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run the issue classifier; the result comes back as
    /// `Msg::ClassificationFinished` with the same `request_id`.
    ClassifyIssue {
        request_id: RequestId,
        description: String,
        image: Option<String>,
    },
}
