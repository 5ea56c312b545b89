use reqwest::header::USER_AGENT;
use serde::Serialize;
use serde_json::Value;
use crate::error::{AppError, Result};
use crate::HTTP_CLIENT;

const GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";

// The username travels in the variables map, never spliced into the
// query document itself.
const PROFILE_QUERY: &str = r#"
query ($login: String!) {
  user(login: $login) {
    name
    bio
    avatarUrl
    location
    pinnedItems(first: 6, types: [REPOSITORY]) {
      edges {
        node {
          ... on Repository {
            name
            description
            forkCount
            stargazers { totalCount }
            url
            id
            diskUsage
            primaryLanguage { name color }
          }
        }
      }
    }
  }
}
"#;

#[derive(Serialize)]
struct ProfileRequest<'a> {
    query: &'a str,
    variables: ProfileVariables<'a>,
}

#[derive(Serialize)]
struct ProfileVariables<'a> {
    login: &'a str,
}

fn profile_request(username: &str) -> ProfileRequest<'_> {
    ProfileRequest {
        query: PROFILE_QUERY,
        variables: ProfileVariables { login: username },
    }
}

/// Fetch a user's profile from the GitHub GraphQL API and return the
/// upstream response body verbatim.
pub async fn fetch_profile(token: &str, username: &str) -> Result<Value> {
    let response = HTTP_CLIENT
        .post(GITHUB_GRAPHQL_URL)
        .bearer_auth(token)
        .header(USER_AGENT, "profile-feed-proxy")
        .json(&profile_request(username))
        .send()
        .await
        .map_err(|e| AppError::GithubFetch(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::GithubFetch(format!(
            "HTTP {} from {}",
            status, GITHUB_GRAPHQL_URL
        )));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| AppError::GithubFetch(e.to_string()))?;

    Ok(body)
}
