//! Seed-centered spatial clustering of location records.
//!
//! A single greedy pass over the Store: the first unassigned record seeds a
//! cluster, and every later unassigned record within `radius_m` of the seed
//! joins it. Membership is measured against the seed only, never against a
//! centroid or other members, so two members of one cluster can be up to
//! `2 * radius_m` apart.
//!
//! Clusters are a pure function of the records and their order; they are
//! rebuilt from scratch on every call.

use mindtrail_core::{Cluster, ClusterCenter, LocationRecord};
use tracing::trace;

/// Partition `records` into clusters of radius `radius_m`.
///
/// Every record lands in exactly one cluster. Clusters appear in the order
/// their seeds occur in `records`; within a cluster the seed comes first,
/// followed by members in `records` order.
pub fn build_clusters(records: &[LocationRecord], radius_m: f64) -> Vec<Cluster> {
    let mut assigned = vec![false; records.len()];
    let mut clusters = Vec::new();

    for (seed_idx, seed) in records.iter().enumerate() {
        if assigned[seed_idx] {
            continue;
        }

        let center = seed.coordinates();
        let mut contents = vec![seed.clone()];

        for (idx, other) in records.iter().enumerate() {
            if idx == seed_idx || assigned[idx] {
                continue;
            }
            let distance = other.distance_to(&center);
            if distance <= radius_m {
                trace!(
                    seed_id = %seed.id,
                    location_id = %other.id,
                    distance_m = distance,
                    "cluster: member joined"
                );
                contents.push(other.clone());
                assigned[idx] = true;
            }
        }

        assigned[seed_idx] = true;
        clusters.push(Cluster {
            center: ClusterCenter {
                latitude: seed.latitude,
                longitude: seed.longitude,
                timestamp: seed.timestamp,
            },
            radius_m,
            contents,
        });
    }

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mindtrail_core::{new_id, ContentType};

    fn record(lat: f64, lon: f64) -> LocationRecord {
        let now = Utc::now();
        LocationRecord {
            id: new_id(),
            content_id: format!("moment_{}_{}", lat, lon),
            content_type: ContentType::Moment,
            title: "test".to_string(),
            preview: None,
            thumbnail: None,
            latitude: lat,
            longitude: lon,
            accuracy: None,
            address: None,
            city: None,
            country: None,
            timestamp: now,
            created_at: now,
            revisits: vec![],
        }
    }

    #[test]
    fn test_empty_store_has_no_clusters() {
        assert!(build_clusters(&[], 500.0).is_empty());
    }

    #[test]
    fn test_single_record_is_its_own_cluster() {
        let r = record(39.9042, 116.4074);
        let clusters = build_clusters(std::slice::from_ref(&r), 500.0);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].contents, vec![r.clone()]);
        assert_eq!(clusters[0].center.latitude, r.latitude);
        assert_eq!(clusters[0].center.timestamp, r.timestamp);
        assert_eq!(clusters[0].radius_m, 500.0);
    }

    #[test]
    fn test_beijing_example_yields_two_clusters() {
        let a = record(39.9042, 116.4074);
        let b = record(39.9050, 116.4080);
        let c = record(40.0084, 116.2972);
        let clusters = build_clusters(&[a.clone(), b.clone(), c.clone()], 500.0);

        assert_eq!(clusters.len(), 2);
        let ids: Vec<_> = clusters[0].contents.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
        assert_eq!(clusters[1].contents.len(), 1);
        assert_eq!(clusters[1].contents[0].id, c.id);
    }

    #[test]
    fn test_center_is_seed_not_centroid() {
        let a = record(39.9042, 116.4074);
        let b = record(39.9050, 116.4080);
        let clusters = build_clusters(&[a.clone(), b], 500.0);
        assert_eq!(clusters[0].center.coordinates(), a.coordinates());
    }

    #[test]
    fn test_members_measured_against_seed_only() {
        // Roughly 400 m steps north: B is within radius of A and C,
        // but C is 800 m from the seed A.
        let a = record(0.0, 0.0);
        let b = record(0.0036, 0.0);
        let c = record(0.0072, 0.0);
        let clusters = build_clusters(&[a.clone(), b.clone(), c.clone()], 500.0);

        assert_eq!(clusters.len(), 2);
        assert_eq!(
            clusters[0].contents.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![a.id, b.id]
        );
        assert_eq!(clusters[1].contents[0].id, c.id);
    }

    #[test]
    fn test_members_can_be_farther_apart_than_radius() {
        // B and C sit on opposite sides of seed A, ~450 m each way.
        let a = record(0.0, 0.0);
        let b = record(0.00405, 0.0);
        let c = record(-0.00405, 0.0);
        let clusters = build_clusters(&[a, b.clone(), c.clone()], 500.0);

        assert_eq!(clusters.len(), 1);
        assert!(b.distance_to(&c.coordinates()) > 500.0);
    }

    #[test]
    fn test_order_of_store_decides_seeds() {
        let a = record(0.0, 0.0);
        let b = record(0.0036, 0.0);
        let c = record(0.0072, 0.0);

        // Seeding from the middle pulls both neighbours in.
        let clusters = build_clusters(&[b.clone(), a.clone(), c.clone()], 500.0);
        assert_eq!(clusters.len(), 1);
        assert_eq!(
            clusters[0].contents.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![b.id, a.id, c.id]
        );
    }

    #[test]
    fn test_boundary_distance_is_inclusive() {
        let a = record(0.0, 0.0);
        let b = record(0.0, 0.001);
        let exact = b.distance_to(&a.coordinates());
        let clusters = build_clusters(&[a, b], exact);
        assert_eq!(clusters.len(), 1);
    }

    #[test]
    fn test_duplicate_positions_share_a_cluster() {
        let a = record(39.9, 116.4);
        let b = record(39.9, 116.4);
        let clusters = build_clusters(&[a, b], 500.0);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 2);
    }
}
