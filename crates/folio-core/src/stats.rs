//! Dashboard counters.

use serde::Serialize;

use crate::error::Result;
use crate::models::ContactInquiry;
use crate::store::{CollectionName, Filter, SortOrder, Store};

/// How many of the newest contact inquiries the dashboard lists.
pub const RECENT_CONTACTS_LIMIT: usize = 5;

/// Counts shown on the admin dashboard, plus the newest inquiries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_projects: usize,
    pub total_services: usize,
    pub total_testimonials: usize,
    pub total_contacts: usize,
    pub unread_contacts: usize,
    pub published_blogs: usize,
    pub total_blogs: usize,
    pub recent_contacts: Vec<ContactInquiry>,
}

impl DashboardStats {
    /// Count records across collections.
    ///
    /// Services count only when active and testimonials only when approved.
    pub fn collect(store: &Store) -> Result<Self> {
        let count = |name: CollectionName, filter: Filter| store.get(name).count(&filter);

        Ok(Self {
            total_projects: count(CollectionName::Projects, Filter::new())?,
            total_services: count(CollectionName::Services, Filter::new().eq("active", true))?,
            total_testimonials: count(
                CollectionName::Testimonials,
                Filter::new().eq("approved", true),
            )?,
            total_contacts: count(CollectionName::Contacts, Filter::new())?,
            unread_contacts: count(CollectionName::Contacts, Filter::new().eq("read", false))?,
            published_blogs: count(CollectionName::Blogs, Filter::new().eq("published", true))?,
            total_blogs: count(CollectionName::Blogs, Filter::new())?,
            recent_contacts: store
                .records::<ContactInquiry>()
                .find_all()
                .sort("created_at", SortOrder::Descending)
                .limit(RECENT_CONTACTS_LIMIT)
                .to_list_as(None)?,
        })
    }
}
