//! Listing filters for areas and processes.
//!
//! # Responsibility
//! - Define typed filter/sort/page options consumed by repositories.
//! - Convert the raw query-string bag (`ListParams`) into typed queries.
//!
//! # Invariants
//! - Sort fields are whitelisted; unknown names fall back to `createdAt`.
//! - Blank search/filter text is treated as absent.

use crate::model::area::AreaId;
use crate::model::process::{ProcessId, ProcessType};
use crate::model::validation::ValidationError;
use crate::pagination::{PageRequest, SortOrder};
use serde::Deserialize;
use uuid::Uuid;

/// Raw listing parameters as they arrive from a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub area_id: Option<String>,
    pub parent_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub responsible: Option<String>,
}

impl ListParams {
    fn page_request(&self) -> PageRequest {
        PageRequest::parse(self.page.as_deref(), self.limit.as_deref())
    }
}

/// Sortable area columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AreaSortField {
    Name,
    Description,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl AreaSortField {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("name") => Self::Name,
            Some("description") => Self::Description,
            Some("updatedAt" | "updated_at") => Self::UpdatedAt,
            _ => Self::CreatedAt,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

/// Sortable process columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProcessSortField {
    Name,
    Type,
    Responsible,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl ProcessSortField {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("name") => Self::Name,
            Some("type") => Self::Type,
            Some("responsible") => Self::Responsible,
            Some("updatedAt" | "updated_at") => Self::UpdatedAt,
            _ => Self::CreatedAt,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Type => "type",
            Self::Responsible => "responsible",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

/// Area listing options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AreaQuery {
    pub page: PageRequest,
    /// Case-insensitive substring over name and description.
    pub search: Option<String>,
    /// Case-insensitive substring over name only.
    pub name: Option<String>,
    /// Case-insensitive substring over description only.
    pub description: Option<String>,
    pub sort_by: AreaSortField,
    pub sort_order: SortOrder,
}

impl AreaQuery {
    pub fn from_params(params: &ListParams) -> Self {
        Self {
            page: params.page_request(),
            search: non_blank(params.search.as_deref()),
            name: non_blank(params.name.as_deref()),
            description: non_blank(params.description.as_deref()),
            sort_by: AreaSortField::parse(params.sort_by.as_deref()),
            sort_order: SortOrder::parse(params.sort_order.as_deref()),
        }
    }

    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = non_blank(Some(search.into().as_str()));
        self
    }

    pub fn sorted(mut self, sort_by: AreaSortField, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self
    }
}

/// Parent constraint for process listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParentFilter {
    /// No constraint.
    #[default]
    Any,
    /// Only root processes (`parentId` is null).
    Root,
    /// Only direct children of the given process.
    Of(ProcessId),
}

impl ParentFilter {
    /// `"null"` selects roots; anything else must be a process id.
    pub fn parse(value: Option<&str>) -> Result<Self, ValidationError> {
        match value.map(str::trim).filter(|text| !text.is_empty()) {
            None => Ok(Self::Any),
            Some("null") => Ok(Self::Root),
            Some(text) => parse_id("parentId", text).map(Self::Of),
        }
    }
}

/// Process listing options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessQuery {
    pub page: PageRequest,
    /// Case-insensitive substring over name, description, tools, responsible.
    pub search: Option<String>,
    pub area_id: Option<AreaId>,
    pub parent: ParentFilter,
    pub kind: Option<ProcessType>,
    /// Exact match on `responsible`.
    pub responsible: Option<String>,
    pub sort_by: ProcessSortField,
    pub sort_order: SortOrder,
}

impl ProcessQuery {
    /// Fails when `areaId`/`parentId` are not ids or `type` is unknown.
    pub fn from_params(params: &ListParams) -> Result<Self, ValidationError> {
        let area_id = non_blank(params.area_id.as_deref())
            .map(|text| parse_id("areaId", &text))
            .transpose()?;
        let kind = non_blank(params.kind.as_deref())
            .map(|text| text.parse::<ProcessType>())
            .transpose()?;

        Ok(Self {
            page: params.page_request(),
            search: non_blank(params.search.as_deref()),
            area_id,
            parent: ParentFilter::parse(params.parent_id.as_deref())?,
            kind,
            responsible: non_blank(params.responsible.as_deref()),
            sort_by: ProcessSortField::parse(params.sort_by.as_deref()),
            sort_order: SortOrder::parse(params.sort_order.as_deref()),
        })
    }

    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }

    pub fn in_area(mut self, area_id: AreaId) -> Self {
        self.area_id = Some(area_id);
        self
    }

    pub fn with_parent(mut self, parent: ParentFilter) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = non_blank(Some(search.into().as_str()));
        self
    }

    pub fn sorted(mut self, sort_by: ProcessSortField, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn parse_id(field: &'static str, value: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(value).map_err(|_| ValidationError::InvalidValue {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{
        AreaQuery, AreaSortField, ListParams, ParentFilter, ProcessQuery, ProcessSortField,
    };
    use crate::model::process::ProcessType;
    use crate::model::validation::ValidationError;
    use crate::pagination::SortOrder;
    use uuid::Uuid;

    #[test]
    fn parent_filter_null_selects_roots() {
        assert_eq!(ParentFilter::parse(Some("null")).unwrap(), ParentFilter::Root);
        assert_eq!(ParentFilter::parse(Some("  ")).unwrap(), ParentFilter::Any);
        assert_eq!(ParentFilter::parse(None).unwrap(), ParentFilter::Any);

        let id = Uuid::new_v4();
        assert_eq!(
            ParentFilter::parse(Some(&id.to_string())).unwrap(),
            ParentFilter::Of(id)
        );
    }

    #[test]
    fn process_query_from_query_string_json() {
        let area_id = Uuid::new_v4();
        let params: ListParams = serde_json::from_value(serde_json::json!({
            "page": "2",
            "limit": "5",
            "search": "  hiring ",
            "sortBy": "name",
            "sortOrder": "asc",
            "areaId": area_id.to_string(),
            "parentId": "null",
            "type": "systemic",
        }))
        .unwrap();

        let query = ProcessQuery::from_params(&params).unwrap();
        assert_eq!(query.page.page(), 2);
        assert_eq!(query.page.limit(), 5);
        assert_eq!(query.search.as_deref(), Some("hiring"));
        assert_eq!(query.area_id, Some(area_id));
        assert_eq!(query.parent, ParentFilter::Root);
        assert_eq!(query.kind, Some(ProcessType::Systemic));
        assert_eq!(query.sort_by, ProcessSortField::Name);
        assert_eq!(query.sort_order, SortOrder::Asc);
    }

    #[test]
    fn process_query_rejects_malformed_area_id() {
        let params = ListParams {
            area_id: Some("not-an-id".to_string()),
            ..ListParams::default()
        };
        let err = ProcessQuery::from_params(&params).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidValue { field: "areaId", .. }
        ));
    }

    #[test]
    fn area_query_defaults_to_created_at_desc() {
        let query = AreaQuery::from_params(&ListParams {
            sort_by: Some("password".to_string()),
            ..ListParams::default()
        });
        assert_eq!(query.sort_by, AreaSortField::CreatedAt);
        assert_eq!(query.sort_order, SortOrder::Desc);
        assert_eq!(query.page.page(), 1);
        assert_eq!(query.page.limit(), 10);
    }
}
