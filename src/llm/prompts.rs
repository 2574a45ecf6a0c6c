pub const INVOCATION_RESOLVER: &str = r#"You resolve a branch comparison request into a single
tool call. Use the compare_branches tool and fill every parameter from the request. The
'basehead' parameter joins the base and head refs as 'base...head'. Do not answer in prose."#;
