use serde_json::{json, Value};

use crate::error::Result;
use crate::request::RequestType;

use super::entity::Dataset;

impl Dataset {
    /// Submits the draft for review.
    ///
    /// # Returns
    ///
    /// The server's answer, typically `inReview` and a message.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The API request fails.
    /// - The dataset is already under review.
    pub fn submit(&self) -> Result<Value> {
        self.client
            .post(&self.path("submitForReview"), None, RequestType::Plain)
    }

    /// Returns a dataset under review to its author.
    ///
    /// # Arguments
    ///
    /// * `reason` - Why the dataset is returned, shown to the author.
    pub fn reject(&self, reason: &str) -> Result<Value> {
        let body = RequestType::json(&json!({ "reasonForReturn": reason }))?;
        self.client.post(&self.path("returnToAuthor"), None, body)
    }
}
