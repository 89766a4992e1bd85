//! Typed records stored in the backend's collections.
//!
//! Optional fields are `Option<T>` and are left out of the stored record when
//! `None`, so "absent" stays distinct from an explicit `null`. Fields added
//! later must default when absent: stored snapshots are never migrated.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FolioError, Result};
use crate::store::CollectionName;

/// A typed record bound to its collection.
pub trait Record: Serialize + DeserializeOwned {
    const COLLECTION: CollectionName;

    fn id(&self) -> &str;
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_true() -> bool {
    true
}

fn default_role() -> String {
    "admin".to_string()
}

/// Token version assumed for accounts stored before versioning existed.
pub const INITIAL_TOKEN_VERSION: u64 = 1;

fn default_token_version() -> u64 {
    INITIAL_TOKEN_VERSION
}

/// Timestamps are written as RFC 3339. Records written by earlier versions
/// of the backend may carry ISO-8601 values without an offset; those are
/// read as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    pub fn parse(value: &str) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
            return Some(parsed.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {}", raw)))
    }

    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {}", raw))),
        }
    }
}

/// An administrator account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    pub id: String,

    pub email: String,

    /// PHC-format password hash
    pub password: String,

    pub name: String,

    #[serde(default = "default_role")]
    pub role: String,

    /// Bumped on every password change; tokens carrying an older value are revoked
    #[serde(default = "default_token_version")]
    pub token_version: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

impl Admin {
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            email: email.into(),
            password: password_hash.into(),
            name: name.into(),
            role: default_role(),
            token_version: INITIAL_TOKEN_VERSION,
            phone: None,
            address: None,
            bio: None,
            avatar: None,
            created_at: Utc::now(),
        }
    }
}

impl Record for Admin {
    const COLLECTION: CollectionName = CollectionName::Admins;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Public view of an admin, without credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl From<&Admin> for AdminProfile {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id.clone(),
            email: admin.email.clone(),
            name: admin.name.clone(),
            role: admin.role.clone(),
            phone: admin.phone.clone(),
            address: admin.address.clone(),
            bio: admin.bio.clone(),
            avatar: admin.avatar.clone(),
        }
    }
}

/// A service offered on the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: String,
    pub duration: String,
    #[serde(default)]
    pub features: Vec<String>,
    pub icon: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

impl Record for Service {
    const COLLECTION: CollectionName = CollectionName::Services;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Validated input for a new service.
#[derive(Debug, Clone, Deserialize)]
pub struct NewService {
    pub title: String,
    pub description: String,
    pub price: String,
    pub duration: String,
    #[serde(default)]
    pub features: Vec<String>,
    pub icon: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl NewService {
    pub fn into_record(self) -> Service {
        Service {
            id: new_id(),
            title: self.title,
            description: self.description,
            price: self.price,
            duration: self.duration,
            features: self.features,
            icon: self.icon,
            active: self.active,
            created_at: Utc::now(),
        }
    }
}

/// Partial service update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServicePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// A portfolio project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub live_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

impl Record for Project {
    const COLLECTION: CollectionName = CollectionName::Projects;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub image: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub live_url: String,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

impl NewProject {
    pub fn into_record(self) -> Project {
        Project {
            id: new_id(),
            title: self.title,
            description: self.description,
            image: self.image,
            category: self.category,
            tags: self.tags,
            technologies: self.technologies,
            live_url: self.live_url,
            github_url: self.github_url,
            featured: self.featured,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technologies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

/// Lowest and highest accepted testimonial rating.
pub const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

fn validate_rating(rating: u8) -> Result<()> {
    if !RATING_RANGE.contains(&rating) {
        return Err(FolioError::Validation(format!(
            "Rating must be between {} and {} (got {})",
            RATING_RANGE.start(),
            RATING_RANGE.end(),
            rating
        )));
    }
    Ok(())
}

/// A client testimonial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: String,
    pub name: String,
    pub position: String,
    pub company: String,
    pub text: String,
    pub rating: u8,
    pub image: String,
    #[serde(default = "default_true")]
    pub approved: bool,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

impl Record for Testimonial {
    const COLLECTION: CollectionName = CollectionName::Testimonials;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTestimonial {
    pub name: String,
    pub position: String,
    pub company: String,
    pub text: String,
    pub rating: u8,
    pub image: String,
    #[serde(default = "default_true")]
    pub approved: bool,
}

impl NewTestimonial {
    /// # Errors
    ///
    /// Returns `FolioError::Validation` if the rating is outside 1..=5.
    pub fn into_record(self) -> Result<Testimonial> {
        validate_rating(self.rating)?;
        Ok(Testimonial {
            id: new_id(),
            name: self.name,
            position: self.position,
            company: self.company,
            text: self.text,
            rating: self.rating,
            image: self.image,
            approved: self.approved,
            created_at: Utc::now(),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestimonialPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
}

impl TestimonialPatch {
    pub fn validate(&self) -> Result<()> {
        match self.rating {
            Some(rating) => validate_rating(rating),
            None => Ok(()),
        }
    }
}

fn default_author() -> String {
    "Admin".to_string()
}

/// A blog post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub image: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub publish_date: DateTime<Utc>,
    #[serde(default)]
    pub published: bool,
    pub read_time: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

impl Record for BlogPost {
    const COLLECTION: CollectionName = CollectionName::Blogs;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBlogPost {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub image: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_author")]
    pub author: String,
    /// Defaults to the creation time
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub publish_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub published: bool,
    pub read_time: String,
}

impl NewBlogPost {
    pub fn into_record(self) -> BlogPost {
        let now = Utc::now();
        BlogPost {
            id: new_id(),
            title: self.title,
            excerpt: self.excerpt,
            content: self.content,
            image: self.image,
            category: self.category,
            tags: self.tags,
            author: self.author,
            publish_date: self.publish_date.unwrap_or(now),
            published: self.published,
            read_time: self.read_time,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlogPostPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "timestamp::deserialize_option"
    )]
    pub publish_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
}

/// A message submitted through the public contact form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInquiry {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub project_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(default)]
    pub read: bool,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

impl Record for ContactInquiry {
    const COLLECTION: CollectionName = CollectionName::Contacts;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub project_type: String,
    #[serde(default)]
    pub budget: Option<String>,
    pub message: String,
    #[serde(default)]
    pub timeline: Option<String>,
}

impl NewContact {
    pub fn into_record(self) -> ContactInquiry {
        ContactInquiry {
            id: new_id(),
            name: self.name,
            email: self.email,
            phone: self.phone,
            project_type: self.project_type,
            budget: self.budget,
            message: self.message,
            timeline: self.timeline,
            read: false,
            created_at: Utc::now(),
        }
    }
}
