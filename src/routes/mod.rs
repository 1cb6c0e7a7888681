/*!
 * Route classifier
 *
 * Responsibility:
 * - Static, ordered policy table: (method, path) -> Visibility
 * - First matching rule wins; unmatched requests are Protected (fail-closed)
 *
 * Public API:
 * - RouteTable::standard() / RouteTable::classify()
 * - RouteRule / MethodMatcher / PathMatcher for building other tables in tests
 */

mod rule;
mod table;

pub(crate) use rule::segment_prefix;
pub use rule::{MethodMatcher, PathMatcher, RouteRule};
pub use table::RouteTable;
