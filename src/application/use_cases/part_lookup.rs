use crate::hierarchy::domain::Part;
use crate::ports::outbound::QueryGateway;

/// Looks up part master data for rows that arrived without joined flags
///
/// A failed lookup never fails the caller: the part stays unknown and its
/// node classifies as UNKNOWN until a later fetch supplies the flags.
pub(crate) async fn lookup_parts<G>(gateway: &G, part_ids: &[String]) -> Vec<Part>
where
    G: QueryGateway + ?Sized,
{
    let mut parts = Vec::with_capacity(part_ids.len());
    let mut failed = 0usize;

    for part_id in part_ids {
        match gateway.fetch_part(part_id).await {
            Ok(part) => parts.push(part),
            Err(e) => {
                failed += 1;
                tracing::warn!(part = %part_id, error = %e, "part lookup failed; flags left unknown");
            }
        }
    }

    if !part_ids.is_empty() {
        tracing::debug!(requested = part_ids.len(), found = parts.len(), failed, "part lookups finished");
    }
    parts
}
