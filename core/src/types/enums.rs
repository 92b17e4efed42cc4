use serde::{Deserialize, Serialize};

/// Sort direction appended to the `sort` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Channel an event originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventContext {
    Web,
    Mobile,
    Ecommerce,
    Retail,
    Iot,
    Social,
    DigitalCampaign,
    ContactCenter,
    Other,
}

impl EventContext {
    pub fn as_str(self) -> &'static str {
        match self {
            EventContext::Web => "WEB",
            EventContext::Mobile => "MOBILE",
            EventContext::Ecommerce => "ECOMMERCE",
            EventContext::Retail => "RETAIL",
            EventContext::Iot => "IOT",
            EventContext::Social => "SOCIAL",
            EventContext::DigitalCampaign => "DIGITAL_CAMPAIGN",
            EventContext::ContactCenter => "CONTACT_CENTER",
            EventContext::Other => "OTHER",
        }
    }
}

/// Whether the customer triggered the event or it happened to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventMode {
    Active,
    Passive,
}

impl EventMode {
    pub fn as_str(self) -> &'static str {
        match self {
            EventMode::Active => "ACTIVE",
            EventMode::Passive => "PASSIVE",
        }
    }
}

/// How a bring-back envelope identifies its customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BringBackType {
    ExternalId,
    SessionId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchoolType {
    PrimarySchool,
    SecondarySchool,
    HighSchool,
    College,
    Other,
}
