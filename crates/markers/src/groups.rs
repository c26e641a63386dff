use crate::marker::Marker;
use serde::Serialize;
use std::collections::HashMap;

/// Markers sharing one authentication context (session id + auth token).
///
/// Membership is immutable once computed for a pass; the whole group is
/// authenticated together exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionGroup {
    pub session_id: String,
    pub auth_token: String,
    /// Indices into the discovery snapshot, in document order.
    pub members: Vec<usize>,
}

/// Group a discovery snapshot by (session id, auth token).
///
/// Groups come out in first-seen order; members keep document order.
pub fn group_by_session(markers: &[Marker]) -> Vec<SessionGroup> {
    let mut groups: Vec<SessionGroup> = Vec::new();
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();

    for (position, marker) in markers.iter().enumerate() {
        let key = (marker.session_id.as_str(), marker.auth_token.as_str());
        match index.get(&key) {
            Some(&slot) => groups[slot].members.push(position),
            None => {
                index.insert(key, groups.len());
                groups.push(SessionGroup {
                    session_id: marker.session_id.clone(),
                    auth_token: marker.auth_token.clone(),
                    members: vec![position],
                });
            }
        }
    }

    groups
}
