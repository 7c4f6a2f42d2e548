//! Template listing.

use serde::Deserialize;
use tilaa_core::envelope::Envelope;
use tilaa_core::Result;

use crate::client::TilaaClient;
use crate::models::Template;

const BASE_PATH: &str = "templates";

#[derive(Debug, Deserialize)]
struct TemplateList {
    #[serde(default)]
    templates: Vec<Template>,
}

/// Template endpoints.
#[derive(Debug, Clone, Copy)]
pub struct TemplateService<'a> {
    client: &'a TilaaClient,
}

impl<'a> TemplateService<'a> {
    pub(crate) fn new(client: &'a TilaaClient) -> Self {
        Self { client }
    }

    /// List the operating system templates VMs can be installed from.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an `ERROR` response.
    pub async fn list(&self) -> Result<Vec<Template>> {
        let response: Envelope<TemplateList> = self.client.api().get(BASE_PATH).await?;
        Ok(response.into_result()?.templates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tilaa_core::id::TemplateId;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn list_templates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/templates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "templates": [
                    {"id": 7, "name": "Debian 12", "ram": 512, "storage": 10},
                    {"id": 8, "name": "Ubuntu 24.04", "ram": 1024, "storage": 20}
                ]
            })))
            .mount(&server)
            .await;

        let client = TilaaClient::builder("test", "test123")
            .with_base_url(server.uri())
            .build()
            .unwrap();
        let templates = client.templates().list().await.unwrap();
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[1].id, TemplateId::new(8));
        assert_eq!(templates[1].ram, 1024);
    }
}
