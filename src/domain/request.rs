use crate::domain::validation::ValidationError;
use crate::domain::value::{Destination, MessageText, SenderId};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One message in a `BulkMessages` request.
pub struct Message {
    destination: Destination,
    content: MessageText,
}

impl Message {
    pub fn new(destination: Destination, content: MessageText) -> Self {
        Self {
            destination,
            content,
        }
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn content(&self) -> &MessageText {
        &self.content
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Optional send options attached to a `BulkMessages` request.
///
/// Only serialized when at least one option is set, matching the vendor's
/// payload shape (`SendOptions` is omitted entirely otherwise).
pub struct SendOptions {
    pub sender_id: Option<SenderId>,
}

impl SendOptions {
    pub fn is_empty(&self) -> bool {
        self.sender_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A `BulkMessages` send request.
///
/// The endpoint accepts a batch; [`SendMessage::single`] covers the common
/// one-recipient case.
pub struct SendMessage {
    messages: Vec<Message>,
    options: SendOptions,
}

impl SendMessage {
    /// Create a batch request. The batch must not be empty.
    pub fn new(messages: Vec<Message>) -> Result<Self, ValidationError> {
        if messages.is_empty() {
            return Err(ValidationError::Empty { field: "messages" });
        }
        Ok(Self {
            messages,
            options: SendOptions::default(),
        })
    }

    /// Create a request for a single message.
    pub fn single(destination: Destination, content: MessageText) -> Self {
        Self {
            messages: vec![Message::new(destination, content)],
            options: SendOptions::default(),
        }
    }

    /// Set the sender id (`SendOptions.senderId`).
    pub fn with_sender_id(mut self, sender_id: SenderId) -> Self {
        self.options.sender_id = Some(sender_id);
        self
    }

    /// Replace the options wholesale.
    pub fn with_options(mut self, options: SendOptions) -> Self {
        self.options = options;
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn options(&self) -> &SendOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_must_not_be_empty() {
        let err = SendMessage::new(Vec::new()).unwrap_err();
        assert!(matches!(err, ValidationError::Empty { field: "messages" }));
    }

    #[test]
    fn single_builds_one_message_without_options() {
        let request = SendMessage::single(
            Destination::new("+27000000000").unwrap(),
            MessageText::new("hi").unwrap(),
        );
        assert_eq!(request.messages().len(), 1);
        assert!(request.options().is_empty());
    }

    #[test]
    fn with_sender_id_populates_options() {
        let request = SendMessage::single(
            Destination::new("+27000000000").unwrap(),
            MessageText::new("hi").unwrap(),
        )
        .with_sender_id(SenderId::new("+27111111111").unwrap());
        assert_eq!(
            request.options().sender_id.as_ref().map(SenderId::as_str),
            Some("+27111111111")
        );
        assert!(!request.options().is_empty());
    }
}
