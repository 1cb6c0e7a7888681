/*
 * Responsibility
 * - Edge middleware, outermost last:
 *   edge (classify -> authenticate) < http (trace, limits, timeout) < security headers < cors
 */
pub mod cors;
pub mod edge;
pub mod http;
pub mod security_headers;
