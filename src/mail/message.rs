use super::MailError;
use crate::models::Attachment;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MimeAttachment, Mailbox, MultiPart, SinglePart};
use lettre::Message;

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment: Option<Attachment>,
}

impl OutgoingMail {
    pub fn new(from: impl Into<String>, to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Plain-text body, plus a mixed multipart when there is an attachment.
    pub fn to_message(&self) -> Result<Message, MailError> {
        let builder = Message::builder()
            .from(parse_mailbox(&self.from)?)
            .to(parse_mailbox(&self.to)?)
            .subject(self.subject.clone());

        let text = SinglePart::plain(self.body.clone());

        let message = match &self.attachment {
            Some(attachment) => {
                let content_type = ContentType::parse(&attachment.content_type)
                    .map_err(|e| MailError::Build(format!("Bad content type '{}': {}", attachment.content_type, e)))?;
                let part = MimeAttachment::new(attachment.file_name.clone())
                    .body(attachment.bytes.clone(), content_type);

                builder.multipart(MultiPart::mixed().singlepart(text).singlepart(part))
            }
            None => builder.singlepart(text),
        };

        message.map_err(|e| MailError::Build(e.to_string()))
    }
}

pub fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.trim().parse().map_err(|e: lettre::address::AddressError| MailError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })
}
