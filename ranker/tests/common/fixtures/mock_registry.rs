//! Mock GitHub API serving a chain registry tree

use serde_json::{json, Value};
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use ranker::config::RegistryConfig;

pub const REPOSITORY: &str = "test-org/chain-registry";
pub const BRANCH: &str = "main";

pub struct MockRegistryServer {
    pub server: MockServer,
    pub base_url: String,
}

impl MockRegistryServer {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    /// Registry settings pointing at this server
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            repository: REPOSITORY.to_string(),
            branch: BRANCH.to_string(),
            api_base_url: self.base_url.clone(),
            ..RegistryConfig::default()
        }
    }

    /// Serve `documents` as `chainConfig/{name}.json` blobs next to some
    /// unrelated tree entries
    pub async fn mock_chain_documents(&self, documents: &[(&str, Value)]) {
        let mut tree = vec![
            json!({ "path": "README.md", "type": "blob", "url": format!("{}/blobs/readme", self.base_url) }),
            json!({ "path": "chainConfig", "type": "tree", "url": format!("{}/trees/chainConfig", self.base_url) }),
        ];

        for (name, document) in documents {
            tree.push(json!({
                "path": format!("chainConfig/{}.json", name),
                "type": "blob",
                "url": format!("{}/blobs/{}", self.base_url, name)
            }));

            Mock::given(method("GET"))
                .and(path(format!("/blobs/{}", name)))
                .and(header("accept", "application/vnd.github.raw"))
                .respond_with(ResponseTemplate::new(200).set_body_json(document.clone()))
                .mount(&self.server)
                .await;
        }

        self.mock_tree(json!({ "sha": "abc123", "tree": tree, "truncated": false }))
            .await;
    }

    pub async fn mock_tree(&self, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/repos/{}/git/trees/{}", REPOSITORY, BRANCH)))
            .and(query_param("recursive", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// GitHub rate limiting the caller
    pub async fn mock_rate_limited(&self) {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "message": "API rate limit exceeded"
            })))
            .mount(&self.server)
            .await;
    }
}

/// Registry document with a testnet and a mainnet configuration
pub fn chain_document(identifier: &str, rest: &[&str], jrpc: &[&str], web3: &[&str]) -> Value {
    json!({
        "prefix": identifier.to_lowercase(),
        "configurations": [
            {
                "configurationType": "testnet",
                "identifier": format!("{}-testnet", identifier.to_lowercase()),
                "rest": ["https://rest.testnet.example.com"],
                "jrpc": ["https://rpc.testnet.example.com"]
            },
            {
                "configurationType": "mainnet",
                "identifier": identifier.to_lowercase(),
                "rest": rest,
                "jrpc": jrpc,
                "web3": web3
            }
        ]
    })
}
