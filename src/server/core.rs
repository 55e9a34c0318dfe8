use crate::spec::ParameterMap;

/// Read-only view of an incoming request, as seen by the extractor.
///
/// Only the two query accessors are required. Header, cookie and path lookups
/// default to "not present" so a query-only adapter stays a two-method impl.
pub trait RequestView {
    /// Undecoded query component of the request URL, without the leading `?`.
    fn raw_query_string(&self) -> &str;

    /// The framework's pre-parsed, percent-decoded parameter table.
    fn parameter_map(&self) -> &ParameterMap;

    /// Header value; implementations match names case-insensitively.
    fn header(&self, _name: &str) -> Option<&str> {
        None
    }

    fn cookie(&self, _name: &str) -> Option<&str> {
        None
    }

    /// Path parameter captured by the router.
    fn path_param(&self, _name: &str) -> Option<&str> {
        None
    }
}

impl<T: RequestView + ?Sized> RequestView for &T {
    fn raw_query_string(&self) -> &str {
        (**self).raw_query_string()
    }

    fn parameter_map(&self) -> &ParameterMap {
        (**self).parameter_map()
    }

    fn header(&self, name: &str) -> Option<&str> {
        (**self).header(name)
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        (**self).cookie(name)
    }

    fn path_param(&self, name: &str) -> Option<&str> {
        (**self).path_param(name)
    }
}
