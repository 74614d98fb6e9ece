use crate::key::{generate_key, KeyError, Pagination, QueryKeyParams};

/// Fluent builder for [`QueryKeyParams`].
///
/// Filters accumulate across calls; a later value for the same filter key
/// replaces the earlier one.
#[derive(Debug, Clone, Default)]
pub struct KeyBuilder {
    params: QueryKeyParams,
}

impl KeyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.params.operation = operation.into();
        self
    }

    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.params.provider = provider.into();
        self
    }

    /// Replace the resource type list.
    pub fn resource_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params.resource_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.filters.insert(key.into(), value.into());
        self
    }

    /// Merge a batch of filters into the ones already set.
    pub fn filters<I, K, V>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .filters
            .extend(filters.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn pagination(
        mut self,
        limit: u32,
        offset: u32,
        sort_by: impl Into<String>,
        sort_order: impl Into<String>,
    ) -> Self {
        self.params.pagination = Some(Pagination {
            limit,
            offset,
            sort_by: sort_by.into(),
            sort_order: sort_order.into(),
        });
        self
    }

    pub fn params(&self) -> &QueryKeyParams {
        &self.params
    }

    pub fn into_params(self) -> QueryKeyParams {
        self.params
    }

    pub fn build(&self) -> Result<String, KeyError> {
        generate_key(&self.params)
    }
}
