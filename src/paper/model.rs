use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::CustomError;
use crate::utils::validation::is_valid_email;

pub const MAX_TITLE_LEN: usize = 500;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Author {
    fn normalized(self) -> Self {
        Author {
            name: self.name.trim().to_string(),
            department: clean(self.department),
            affiliation: clean(self.affiliation),
            city: clean(self.city),
            country: clean(self.country),
            email: clean(self.email).map(|e| e.to_lowercase()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl PaperStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaperStatus::Draft => "draft",
            PaperStatus::Published => "published",
            PaperStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for PaperStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaperStatus {
    type Err = CustomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(PaperStatus::Draft),
            "published" => Ok(PaperStatus::Published),
            "archived" => Ok(PaperStatus::Archived),
            other => Err(CustomError::BadRequestError(format!(
                "Invalid status '{other}'. Expected draft, published or archived"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Owner
    pub user: ObjectId,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introduction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literature_review: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methodology: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub status: PaperStatus,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Paper {
    pub fn is_owned_by(&self, user_id: &ObjectId) -> bool {
        &self.user == user_id
    }

    /// Schema rules: required title/abstract, title length, author names and emails.
    pub fn validate(&self) -> Result<(), CustomError> {
        if self.title.is_empty() {
            return Err(CustomError::ValidationError(
                "Please provide a paper title".into(),
            ));
        }
        if self.title.chars().count() > MAX_TITLE_LEN {
            return Err(CustomError::ValidationError(format!(
                "Title cannot be more than {MAX_TITLE_LEN} characters"
            )));
        }
        if self.abstract_text.is_empty() {
            return Err(CustomError::ValidationError(
                "Please provide an abstract".into(),
            ));
        }
        for (index, author) in self.authors.iter().enumerate() {
            if author.name.is_empty() {
                return Err(CustomError::ValidationError(format!(
                    "Author {} is missing a name",
                    index + 1
                )));
            }
            if let Some(email) = &author.email {
                if !is_valid_email(email) {
                    return Err(CustomError::ValidationError(format!(
                        "Please provide a valid email for author {}",
                        index + 1
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Body of create and update requests. On update, absent fields are left as stored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperRequest {
    pub title: Option<String>,
    pub authors: Option<Vec<Author>>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub introduction: Option<String>,
    pub literature_review: Option<String>,
    pub methodology: Option<String>,
    pub conclusion: Option<String>,
    pub references: Option<Vec<String>>,
    pub status: Option<PaperStatus>,
}

impl PaperRequest {
    pub fn into_paper(self, owner: ObjectId, now: DateTime<Utc>) -> Result<Paper, CustomError> {
        let mut paper = Paper {
            id: None,
            user: owner,
            title: String::new(),
            authors: Vec::new(),
            abstract_text: String::new(),
            keywords: Vec::new(),
            introduction: None,
            literature_review: None,
            methodology: None,
            conclusion: None,
            references: Vec::new(),
            status: PaperStatus::default(),
            created_at: now,
            updated_at: now,
        };
        self.apply_to(&mut paper, now)?;
        Ok(paper)
    }

    /// Merge the supplied fields into `paper`, then re-validate it.
    pub fn apply_to(self, paper: &mut Paper, now: DateTime<Utc>) -> Result<(), CustomError> {
        if let Some(title) = self.title {
            paper.title = title.trim().to_string();
        }
        if let Some(authors) = self.authors {
            paper.authors = authors.into_iter().map(Author::normalized).collect();
        }
        if let Some(abstract_text) = self.abstract_text {
            paper.abstract_text = abstract_text.trim().to_string();
        }
        if let Some(keywords) = self.keywords {
            paper.keywords = clean_list(keywords);
        }
        if self.introduction.is_some() {
            paper.introduction = clean(self.introduction);
        }
        if self.literature_review.is_some() {
            paper.literature_review = clean(self.literature_review);
        }
        if self.methodology.is_some() {
            paper.methodology = clean(self.methodology);
        }
        if self.conclusion.is_some() {
            paper.conclusion = clean(self.conclusion);
        }
        if let Some(references) = self.references {
            paper.references = clean_list(references);
        }
        if let Some(status) = self.status {
            paper.status = status;
        }
        paper.validate()?;
        paper.updated_at = now;
        Ok(())
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub user: String,
    pub title: String,
    pub authors: Vec<Author>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introduction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literature_review: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methodology: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,
    pub references: Vec<String>,
    pub status: PaperStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Paper> for PaperResponse {
    fn from(paper: Paper) -> Self {
        Self {
            id: paper.id.map(|id| id.to_hex()).unwrap_or_default(),
            user: paper.user.to_hex(),
            title: paper.title,
            authors: paper.authors,
            abstract_text: paper.abstract_text,
            keywords: paper.keywords,
            introduction: paper.introduction,
            literature_review: paper.literature_review,
            methodology: paper.methodology,
            conclusion: paper.conclusion,
            references: paper.references,
            status: paper.status,
            created_at: paper.created_at,
            updated_at: paper.updated_at,
        }
    }
}
