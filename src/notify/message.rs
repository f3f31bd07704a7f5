use serde::{Serialize, Serializer};

/// ntfy message priority, serialized as `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Priority {
    Min = 1,
    Low = 2,
    #[default]
    Default = 3,
    High = 4,
    Max = 5,
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// Button attached to a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    pub action: String,
    pub label: String,
    pub url: String,
}

impl Action {
    /// Button that opens `url`.
    pub fn view(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            action: "view".to_string(),
            label: label.into(),
            url: url.into(),
        }
    }
}

/// JSON envelope published to an ntfy server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub topic: String,
    pub message: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Delivery delay in seconds. ntfy's JSON API reads `delay` as duration
    /// text, so the seconds go on the wire as `"90s"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Message {
    pub fn builder(topic: impl Into<String>, body: impl Into<String>) -> MessageBuilder {
        MessageBuilder {
            message: Message {
                topic: topic.into(),
                message: body.into(),
                title: String::new(),
                tags: Vec::new(),
                priority: Priority::Default,
                actions: Vec::new(),
                click: None,
                icon: None,
                delay: None,
                email: None,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct MessageBuilder {
    message: Message,
}

impl MessageBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.message.title = title.into();
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.message.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.message.priority = priority;
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.message.actions.push(action);
        self
    }

    pub fn click(mut self, url: impl Into<String>) -> Self {
        self.message.click = Some(url.into());
        self
    }

    pub fn icon(mut self, url: impl Into<String>) -> Self {
        self.message.icon = Some(url.into());
        self
    }

    /// Delay delivery by `seconds`. Zero means immediate.
    pub fn delay(mut self, seconds: u64) -> Self {
        self.message.delay = (seconds > 0).then(|| format!("{seconds}s"));
        self
    }

    pub fn email(mut self, address: impl Into<String>) -> Self {
        let address = address.into();
        self.message.email = (!address.is_empty()).then_some(address);
        self
    }

    pub fn build(self) -> Message {
        self.message
    }
}
