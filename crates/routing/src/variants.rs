//! Built-in rule tables for the two account variants. Both can be
//! overridden at runtime by a JSON table file; these encode the rules the
//! accounts have run with historically.

use models::Recipient;

use crate::{RoutingRule, RoutingTable, TagPredicate};

pub const SYSADMINS: &str = "DL-TEAM-CLOUD-OPS-SYSADMINS@infor.com";
pub const M3_SYSADMINS: &str = "DL-TEAM-CLOUD-OPS-CMS-M3-SYSADM-MNL@infor.com";
pub const TIGER: &str = "DL-TEAM-LE-TIGER@infor.com";
pub const DBA_MONITORING: &str = "DL-TEAM-CLOUD-OPS-MONITORING-DBA@infor.com";
pub const WFM_ONCALL: &str = "DLG-NA-ICSOnCall-WFM-CRM@Infor.com";
pub const COGC_TEAM: &str = "DLG-INHY-AMS-TC-CoGC@infor.com";

/// Variant A: routing keyed on the CostCenter tag. Instances with a known
/// cost center go to the CoGC application team; everything else, including
/// untagged instances, goes to the sysadmin list.
pub fn cost_center_table() -> RoutingTable {
    RoutingTable {
        rules: vec![rule(
            TagPredicate::CostCenterIn(strings(&["CloudSuite XI", "CloudsuiteDRGDE"])),
            COGC_TEAM,
        )],
        default: Recipient::new(SYSADMINS),
    }
}

/// Variant B: routing keyed on the Product tag, with Service and Owner as
/// fallbacks when Product is absent.
///
/// The `bi`/`ies`/`mingle` products exist on both M3 and Lawson estates and
/// are disambiguated by the Owner tag; owners matching neither team fall to
/// the sysadmin default rather than going unrouted.
pub fn product_table() -> RoutingTable {
    let lawson = &[
        "pubapp", "ion", "iso", "lmrk", "lsf", "cb", "depm", "gfc", "eam", "mscm",
    ];
    let m3 = &["m3", "ft", "glt", "m3base", "Mongoose", "olap", "plm", "clm"];
    let db_services = &["db-mssql", "db-postgres"];
    let identical = &["bi", "ies", "mingle"];
    let m3_owners = &["m3", "crea"];
    let tiger_owners = &["tarek", "tiger"];

    RoutingTable {
        rules: vec![
            rule(
                TagPredicate::ProductInAndOwnerContainsAny {
                    products: strings(identical),
                    owner_any: strings(m3_owners),
                },
                M3_SYSADMINS,
            ),
            rule(
                TagPredicate::ProductInAndOwnerContainsAny {
                    products: strings(identical),
                    owner_any: strings(tiger_owners),
                },
                TIGER,
            ),
            rule(TagPredicate::ProductIn(strings(identical)), SYSADMINS),
            rule(TagPredicate::ProductIn(strings(lawson)), TIGER),
            rule(TagPredicate::ProductIn(strings(m3)), M3_SYSADMINS),
            rule(TagPredicate::ProductIn(strings(&["infra"])), SYSADMINS),
            rule(TagPredicate::ProductIn(strings(&["WFM"])), WFM_ONCALL),
            rule(
                TagPredicate::ProductContains("db".to_string()),
                DBA_MONITORING,
            ),
            rule(TagPredicate::ProductPresent, SYSADMINS),
            // Product tag absent from here on down.
            rule(TagPredicate::ServiceIn(strings(db_services)), DBA_MONITORING),
            rule(
                TagPredicate::OwnerContainsAny(strings(m3_owners)),
                M3_SYSADMINS,
            ),
            rule(
                TagPredicate::OwnerContainsAny(strings(tiger_owners)),
                TIGER,
            ),
        ],
        default: Recipient::new(SYSADMINS),
    }
}

fn rule(when: TagPredicate, recipient: &str) -> RoutingRule {
    RoutingRule {
        when,
        recipient: Recipient::new(recipient),
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use models::TagSet;

    fn tags(pairs: &[(&str, &str)]) -> TagSet {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn cost_center_in_allowlist_routes_to_cogc() {
        let table = cost_center_table();
        assert_eq!(
            table.route(&tags(&[("CostCenter", "CloudSuite XI")])).as_str(),
            COGC_TEAM,
        );
        assert_eq!(
            table.route(&tags(&[("CostCenter", "CloudsuiteDRGDE")])).as_str(),
            COGC_TEAM,
        );
    }

    #[test]
    fn unknown_or_missing_cost_center_routes_to_sysadmins() {
        let table = cost_center_table();
        assert_eq!(
            table.route(&tags(&[("CostCenter", "Payroll")])).as_str(),
            SYSADMINS,
        );
        assert_eq!(table.route(&TagSet::new()).as_str(), SYSADMINS);
    }

    #[test]
    fn product_lists_map_to_their_teams() {
        let table = product_table();
        assert_eq!(table.route(&tags(&[("Product", "m3base")])).as_str(), M3_SYSADMINS);
        assert_eq!(table.route(&tags(&[("Product", "lsf")])).as_str(), TIGER);
        assert_eq!(table.route(&tags(&[("Product", "infra")])).as_str(), SYSADMINS);
        assert_eq!(table.route(&tags(&[("Product", "WFM")])).as_str(), WFM_ONCALL);
    }

    #[test]
    fn identical_products_disambiguate_on_owner() {
        let table = product_table();
        assert_eq!(
            table
                .route(&tags(&[("Product", "bi"), ("Owner", "m3-cloudops")]))
                .as_str(),
            M3_SYSADMINS,
        );
        assert_eq!(
            table
                .route(&tags(&[("Product", "bi"), ("Owner", "tiger-team")]))
                .as_str(),
            TIGER,
        );
        // Owner matching neither team still resolves, to the default.
        assert_eq!(
            table
                .route(&tags(&[("Product", "bi"), ("Owner", "unrelated")]))
                .as_str(),
            SYSADMINS,
        );
        assert_eq!(table.route(&tags(&[("Product", "mingle")])).as_str(), SYSADMINS);
    }

    #[test]
    fn any_db_product_routes_to_dba() {
        let table = product_table();
        assert_eq!(
            table.route(&tags(&[("Product", "db-oracle")])).as_str(),
            DBA_MONITORING,
        );
    }

    #[test]
    fn unlisted_product_routes_to_sysadmins() {
        let table = product_table();
        assert_eq!(
            table.route(&tags(&[("Product", "sharepoint")])).as_str(),
            SYSADMINS,
        );
    }

    #[test]
    fn absent_product_falls_back_to_service_then_owner() {
        let table = product_table();
        assert_eq!(
            table.route(&tags(&[("Service", "db-postgres")])).as_str(),
            DBA_MONITORING,
        );
        assert_eq!(
            table.route(&tags(&[("Owner", "creative")])).as_str(),
            M3_SYSADMINS,
        );
        assert_eq!(
            table.route(&tags(&[("Owner", "tarek")])).as_str(),
            TIGER,
        );
        // Missing Service tag is not an error, unlike the legacy script's
        // unconditional report['Service'] lookup.
        assert_eq!(table.route(&tags(&[("Owner", "nobody")])).as_str(), SYSADMINS);
    }

    #[test]
    fn every_tag_combination_resolves_to_a_nonempty_recipient() {
        let table = product_table();
        let products = [None, Some("bi"), Some("m3"), Some("lsf"), Some("db-x"), Some("zzz")];
        let services = [None, Some("db-postgres"), Some("web")];
        let owners = [None, Some("m3"), Some("tiger"), Some("other")];

        for product in products {
            for service in services {
                for owner in owners {
                    let mut t = TagSet::new();
                    if let Some(p) = product {
                        t.insert("Product", p);
                    }
                    if let Some(s) = service {
                        t.insert("Service", s);
                    }
                    if let Some(o) = owner {
                        t.insert("Owner", o);
                    }
                    assert!(!table.route(&t).is_empty());
                }
            }
        }
    }
}
