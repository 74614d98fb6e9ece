use finscope_budget::CostLineItem;
use finscope_core::QueryKeyParams;

/// Supplier of raw cost line items (the provider layer).
///
/// Implemented for closures so callers and tests can plug in a source
/// without a named type.
pub trait CostSource {
    fn fetch_costs(&self, request: &QueryKeyParams) -> anyhow::Result<Vec<CostLineItem>>;
}

impl<F> CostSource for F
where
    F: Fn(&QueryKeyParams) -> anyhow::Result<Vec<CostLineItem>>,
{
    fn fetch_costs(&self, request: &QueryKeyParams) -> anyhow::Result<Vec<CostLineItem>> {
        self(request)
    }
}
