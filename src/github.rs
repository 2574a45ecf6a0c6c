use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Operation id the function-calling step must resolve.
pub const COMPARE_OPERATION: &str = "compare_branches";

/// The subset of the OpenAPI document the invocation needs.
#[derive(Debug, Deserialize)]
pub struct ServiceSpec {
    servers: Vec<Server>,
    paths: BTreeMap<String, PathItem>,
}

#[derive(Debug, Deserialize)]
struct Server {
    url: String,
}

#[derive(Debug, Deserialize)]
struct PathItem {
    get: Option<Operation>,
}

#[derive(Debug, Deserialize)]
struct Operation {
    #[serde(rename = "operationId")]
    operation_id: String,
    #[serde(default)]
    summary: String,
}

impl ServiceSpec {
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("failed to parse the OpenAPI service description")
    }

    /// Base URL the service is served from.
    pub fn server_url(&self) -> Result<&str> {
        self.servers
            .first()
            .map(|server| server.url.trim_end_matches('/'))
            .ok_or_else(|| anyhow!("the service description declares no servers"))
    }

    /// Path template of the operation with the given id.
    pub fn path_for(&self, operation_id: &str) -> Result<&str> {
        self.paths
            .iter()
            .find(|(_, item)| {
                item.get
                    .as_ref()
                    .is_some_and(|op| op.operation_id == operation_id)
            })
            .map(|(path, _)| path.as_str())
            .ok_or_else(|| {
                anyhow!("the service description has no '{operation_id}' operation")
            })
    }

    /// Human summary of the operation, used as the tool description.
    pub fn operation_summary(&self, operation_id: &str) -> Option<&str> {
        self.paths.values().find_map(|item| {
            item.get
                .as_ref()
                .filter(|op| op.operation_id == operation_id)
                .map(|op| op.summary.as_str())
        })
    }
}

/// A resolved invocation of the compare operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareInvocation {
    pub parameters: CompareParameters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareParameters {
    pub basehead: String,
    pub owner: String,
    pub repo: String,
}

impl CompareInvocation {
    /// Deterministic invocation from the refs, bypassing the model. Used on
    /// the dry-run path and as the reference shape in tests.
    pub fn from_refs(base_ref: &str, head_ref: &str, repository: &str) -> Result<Self> {
        let (owner, repo) = repository.split_once('/').ok_or_else(|| {
            anyhow!("repository {repository:?} is not in 'owner/name' form")
        })?;

        if owner.is_empty() || repo.is_empty() {
            return Err(anyhow!(
                "repository {repository:?} is not in 'owner/name' form"
            ));
        }

        Ok(CompareInvocation {
            parameters: CompareParameters {
                basehead: format!("{base_ref}...{head_ref}"),
                owner: owner.to_string(),
                repo: repo.to_string(),
            },
        })
    }
}

/// Check resolved arguments against the validation schema.
///
/// Covers what the schema actually expresses: required members and primitive
/// types, recursively through object properties. Anything the model invented
/// beyond the schema is left alone.
pub fn validate_invocation(schema: &Value, args: &Value) -> Result<()> {
    validate_node(schema, args, "$")
}

fn validate_node(schema: &Value, value: &Value, path: &str) -> Result<()> {
    if let Some(expected) = schema.get("type").and_then(Value::as_str) {
        let matches = match expected {
            "object" => value.is_object(),
            "array" => value.is_array(),
            "string" => value.is_string(),
            "number" => value.is_number(),
            "integer" => value.is_i64() || value.is_u64(),
            "boolean" => value.is_boolean(),
            "null" => value.is_null(),
            _ => true,
        };

        if !matches {
            return Err(anyhow!(
                "schema validation failed: {path} is not of type '{expected}'"
            ));
        }
    }

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required.iter().filter_map(Value::as_str) {
            if value.get(key).is_none() {
                return Err(anyhow!(
                    "schema validation failed: {path} is missing required member '{key}'"
                ));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (key, subschema) in properties {
            if let Some(member) = value.get(key) {
                validate_node(subschema, member, &format!("{path}.{key}"))?;
            }
        }
    }

    Ok(())
}

/// Client for the OpenAPI-described compare service.
pub struct CompareService {
    client: Client,
    server_url: String,
    path_template: String,
    token: String,
}

impl CompareService {
    pub fn new(spec: &ServiceSpec, token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .context("failed to build HTTP client")?;

        Ok(CompareService {
            client,
            server_url: spec.server_url()?.to_string(),
            path_template: spec.path_for(COMPARE_OPERATION)?.to_string(),
            token,
        })
    }

    /// URL of a concrete invocation.
    pub fn invocation_url(&self, invocation: &CompareInvocation) -> String {
        let p = &invocation.parameters;
        let path = self
            .path_template
            .replace("{owner}", &p.owner)
            .replace("{repo}", &p.repo)
            .replace("{basehead}", &p.basehead);

        format!("{}{}", self.server_url, path)
    }

    /// Execute the comparison and return the raw service response.
    pub fn fetch(&self, invocation: &CompareInvocation) -> Result<Value> {
        let url = self.invocation_url(invocation);

        log::info!("Comparing {} in {}/{}",
            invocation.parameters.basehead,
            invocation.parameters.owner,
            invocation.parameters.repo
        );

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::USER_AGENT, "pr-auto-bot")
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .with_context(|| format!("failed to call the compare service at {url}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_default();
            return Err(anyhow!(
                "compare service error: HTTP {} - {}",
                status.as_u16(),
                text
            ));
        }

        resp.json()
            .context("failed to parse the compare service response")
    }
}

/// Reduce the service response to the configured subtree.
///
/// Only the changed-files portion is forwarded to the generation model; the
/// rest of the comparison would waste tokens and context window.
pub fn response_subtree(response: &Value, subtree: &str) -> Result<String> {
    let node = response
        .get(subtree)
        .ok_or_else(|| anyhow!("the service response has no '{subtree}' subtree"))?;

    serde_json::to_string(node).context("failed to serialize the response subtree")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::assets;

    fn packaged_spec() -> ServiceSpec {
        ServiceSpec::parse(assets::COMPARE_SERVICE_SPEC).unwrap()
    }

    fn packaged_schema() -> Value {
        serde_json::from_str(assets::INVOCATION_SCHEMA).unwrap()
    }

    #[test]
    fn packaged_spec_describes_the_compare_operation() {
        let spec = packaged_spec();

        assert_eq!(spec.server_url().unwrap(), "https://api.github.com");
        assert_eq!(
            spec.path_for(COMPARE_OPERATION).unwrap(),
            "/repos/{owner}/{repo}/compare/{basehead}"
        );
        assert!(!spec.operation_summary(COMPARE_OPERATION).unwrap().is_empty());
    }

    #[test]
    fn unknown_operation_is_an_error() {
        let spec = packaged_spec();
        assert!(spec.path_for("delete_repository").is_err());
    }

    #[test]
    fn invocation_from_refs_splits_the_repository() {
        let invocation =
            CompareInvocation::from_refs("main", "feature/login", "octo/widgets").unwrap();

        assert_eq!(invocation.parameters.owner, "octo");
        assert_eq!(invocation.parameters.repo, "widgets");
        assert_eq!(invocation.parameters.basehead, "main...feature/login");
    }

    #[test]
    fn invocation_rejects_malformed_repository() {
        assert!(CompareInvocation::from_refs("main", "dev", "no-slash").is_err());
        assert!(CompareInvocation::from_refs("main", "dev", "/widgets").is_err());
    }

    #[test]
    fn invocation_url_substitutes_all_parameters() {
        let spec = packaged_spec();
        let service = CompareService::new(&spec, "token".into()).unwrap();
        let invocation = CompareInvocation::from_refs("main", "dev", "octo/widgets").unwrap();

        assert_eq!(
            service.invocation_url(&invocation),
            "https://api.github.com/repos/octo/widgets/compare/main...dev"
        );
    }

    #[test]
    fn valid_invocation_passes_the_packaged_schema() {
        let invocation = CompareInvocation::from_refs("main", "dev", "octo/widgets").unwrap();
        let args = serde_json::to_value(&invocation).unwrap();

        validate_invocation(&packaged_schema(), &args).unwrap();
    }

    #[test]
    fn missing_required_member_fails_validation() {
        let args = json!({ "parameters": { "owner": "octo", "repo": "widgets" } });

        let err = validate_invocation(&packaged_schema(), &args).unwrap_err();
        assert!(err.to_string().contains("basehead"));
    }

    #[test]
    fn wrong_type_fails_validation() {
        let args = json!({ "parameters": { "basehead": 7, "owner": "octo", "repo": "widgets" } });

        let err = validate_invocation(&packaged_schema(), &args).unwrap_err();
        assert!(err.to_string().contains("basehead"));
    }

    #[test]
    fn subtree_extraction_takes_only_the_named_node() {
        let response = json!({
            "files": [{ "filename": "src/lib.rs", "status": "modified" }],
            "commits": [{ "sha": "abc" }]
        });

        let subtree = response_subtree(&response, "files").unwrap();
        assert!(subtree.contains("src/lib.rs"));
        assert!(!subtree.contains("abc"));
    }

    #[test]
    fn missing_subtree_is_an_error() {
        let err = response_subtree(&json!({ "commits": [] }), "files").unwrap_err();
        assert!(err.to_string().contains("'files'"));
    }
}
