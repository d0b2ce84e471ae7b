use log::{error, info};
use minijinja::Environment;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::owners::{OwnersData, PullRef};

pub const TEMPLATE_ERROR: &str = "error.html";
pub const TEMPLATE_INDEX: &str = "index.html";
pub const TEMPLATE_OWNERS: &str = "owners.html";

#[derive(Serialize)]
pub struct TemplateServerContext {
    pub name: String,
    pub about: String,
    pub home_url: Option<String>,
    pub version: &'static str,
}

#[derive(Serialize, Deserialize)]
pub struct TemplateErrorContext {
    pub code: u16,
    pub message: String,
}

/// The pull request an owners page is about.
#[derive(Serialize)]
pub struct TemplatePullContext {
    pub org: String,
    pub repo: String,
    pub number: u64,
    pub repo_url: String,
    pub pull_url: String,
}

#[derive(Serialize)]
pub struct TemplateMemberContext {
    pub handle: String,
    pub profile_url: String,
    pub avatar_url: String,
}

#[derive(Serialize)]
pub struct TemplateOwnersContext {
    pub needs_lgtm: i64,
    pub committers: Vec<TemplateMemberContext>,
    pub reviewers: Vec<TemplateMemberContext>,
}

/// Appends path segments to the GitHub base URL.
fn github_link(github: &Url, segments: &[&str]) -> String {
    let mut url = github.clone();
    if let Ok(mut s) = url.path_segments_mut() {
        s.pop_if_empty();
        s.extend(segments);
    }
    url.to_string()
}

impl TemplatePullContext {
    pub fn new(pull: &PullRef, github: &Url) -> Self {
        let number = pull.number.to_string();
        Self {
            org: pull.org.clone(),
            repo: pull.repo.clone(),
            number: pull.number,
            repo_url: github_link(github, &[pull.org.as_str(), pull.repo.as_str()]),
            pull_url: github_link(
                github,
                &[pull.org.as_str(), pull.repo.as_str(), "pull", number.as_str()],
            ),
        }
    }
}

impl TemplateMemberContext {
    pub fn new(handle: &str, github: &Url) -> Self {
        Self {
            handle: handle.to_string(),
            profile_url: github_link(github, &[handle]),
            avatar_url: github_link(github, &[format!("{handle}.png").as_str()]),
        }
    }
}

impl TemplateOwnersContext {
    pub fn new(owners: &OwnersData, github: &Url) -> Self {
        let members = |handles: &[String]| {
            handles
                .iter()
                .map(|h| TemplateMemberContext::new(h, github))
                .collect::<Vec<_>>()
        };
        Self {
            needs_lgtm: owners.needs_lgtm,
            committers: members(&owners.committers),
            reviewers: members(&owners.reviewers),
        }
    }
}

fn checked_add_template<'a>(env: &mut Environment<'a>, entry: &'a str, data: &'a str) {
    match env.add_template(entry, data) {
        Ok(_) => {
            info!("Added template {}", entry)
        }
        Err(e) => {
            error!("Error adding template for \"{}\": {}", entry, e)
        }
    }
}

pub fn templates_from_builtin<'a>() -> Environment<'a> {
    let mut env = Environment::new();

    checked_add_template(&mut env, TEMPLATE_ERROR, include_str!("error.jinja"));
    checked_add_template(&mut env, TEMPLATE_INDEX, include_str!("index.jinja"));
    checked_add_template(&mut env, TEMPLATE_OWNERS, include_str!("owners.jinja"));
    checked_add_template(&mut env, "footer.html", include_str!("footer.jinja"));
    checked_add_template(&mut env, "header.html", include_str!("header.jinja"));

    env
}
