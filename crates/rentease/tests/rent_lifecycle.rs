//! Integration coverage for the rent lifecycle: property setup, lease
//! assignment, schedule generation, payment recording, and the role-shaped
//! dashboard, exercised through the public service facade and HTTP router.

mod common {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;

    use rentease::auth::{AuthContext, AuthError, Authenticator, UserId, UserRole};
    use rentease::workflows::rent::repository::{
        LeaseRepository, PaymentRepository, PropertyRepository,
    };
    use rentease::workflows::rent::service::{NewLease, NewProperty};
    use rentease::workflows::rent::{
        Lease, LeaseId, PaymentDue, PaymentId, PaymentStatus, Property, PropertyId, RentService,
    };
    use rentease::workflows::store::RepositoryError;

    fn assign_id(sequence: &AtomicU64, prefix: &str) -> String {
        format!("{prefix}-{:06}", sequence.fetch_add(1, Ordering::Relaxed))
    }

    #[derive(Default, Clone)]
    pub(super) struct MemoryProperties {
        records: Arc<Mutex<HashMap<PropertyId, Property>>>,
        sequence: Arc<AtomicU64>,
    }

    impl PropertyRepository for MemoryProperties {
        fn insert(&self, mut property: Property) -> Result<Property, RepositoryError> {
            let mut guard = self.records.lock().expect("lock");
            if property.id.0.is_empty() {
                property.id = PropertyId(assign_id(&self.sequence, "prop"));
            }
            if guard.contains_key(&property.id) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(property.id.clone(), property.clone());
            Ok(property)
        }

        fn fetch(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError> {
            Ok(self.records.lock().expect("lock").get(id).cloned())
        }

        fn owned_by(&self, landlord_id: &UserId) -> Result<Vec<Property>, RepositoryError> {
            let guard = self.records.lock().expect("lock");
            let mut owned: Vec<Property> = guard
                .values()
                .filter(|property| property.landlord_id == *landlord_id)
                .cloned()
                .collect();
            owned.sort_by(|a, b| a.id.0.cmp(&b.id.0));
            Ok(owned)
        }
    }

    #[derive(Default, Clone)]
    pub(super) struct MemoryLeases {
        records: Arc<Mutex<HashMap<LeaseId, Lease>>>,
        sequence: Arc<AtomicU64>,
    }

    impl LeaseRepository for MemoryLeases {
        fn insert(&self, mut lease: Lease) -> Result<Lease, RepositoryError> {
            let mut guard = self.records.lock().expect("lock");
            if lease.id.0.is_empty() {
                lease.id = LeaseId(assign_id(&self.sequence, "lease"));
            }
            if guard.contains_key(&lease.id) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(lease.id.clone(), lease.clone());
            Ok(lease)
        }

        fn fetch(&self, id: &LeaseId) -> Result<Option<Lease>, RepositoryError> {
            Ok(self.records.lock().expect("lock").get(id).cloned())
        }

        fn for_tenant(&self, tenant_id: &UserId) -> Result<Vec<Lease>, RepositoryError> {
            let guard = self.records.lock().expect("lock");
            Ok(guard
                .values()
                .filter(|lease| lease.tenant_id == *tenant_id)
                .cloned()
                .collect())
        }

        fn for_property(&self, property_id: &PropertyId) -> Result<Vec<Lease>, RepositoryError> {
            let guard = self.records.lock().expect("lock");
            Ok(guard
                .values()
                .filter(|lease| lease.property_id == *property_id)
                .cloned()
                .collect())
        }

        fn active_between(
            &self,
            tenant_id: &UserId,
            property_id: &PropertyId,
        ) -> Result<Option<Lease>, RepositoryError> {
            let guard = self.records.lock().expect("lock");
            Ok(guard
                .values()
                .find(|lease| {
                    lease.is_active
                        && lease.tenant_id == *tenant_id
                        && lease.property_id == *property_id
                })
                .cloned())
        }
    }

    #[derive(Default, Clone)]
    pub(super) struct MemoryPayments {
        records: Arc<Mutex<HashMap<PaymentId, PaymentDue>>>,
        sequence: Arc<AtomicU64>,
    }

    impl PaymentRepository for MemoryPayments {
        fn insert_batch(
            &self,
            drafts: Vec<PaymentDue>,
        ) -> Result<Vec<PaymentDue>, RepositoryError> {
            let mut guard = self.records.lock().expect("lock");
            let mut stored = Vec::with_capacity(drafts.len());
            for mut payment in drafts {
                if payment.id.0.is_empty() {
                    payment.id = PaymentId(assign_id(&self.sequence, "pay"));
                }
                if guard.contains_key(&payment.id) {
                    return Err(RepositoryError::Conflict);
                }
                stored.push(payment);
            }
            for payment in &stored {
                guard.insert(payment.id.clone(), payment.clone());
            }
            Ok(stored)
        }

        fn fetch(&self, id: &PaymentId) -> Result<Option<PaymentDue>, RepositoryError> {
            Ok(self.records.lock().expect("lock").get(id).cloned())
        }

        fn update(&self, payment: PaymentDue) -> Result<PaymentDue, RepositoryError> {
            let mut guard = self.records.lock().expect("lock");
            if !guard.contains_key(&payment.id) {
                return Err(RepositoryError::NotFound);
            }
            guard.insert(payment.id.clone(), payment.clone());
            Ok(payment)
        }

        fn for_leases(&self, lease_ids: &[LeaseId]) -> Result<Vec<PaymentDue>, RepositoryError> {
            let guard = self.records.lock().expect("lock");
            let mut payments: Vec<PaymentDue> = guard
                .values()
                .filter(|payment| lease_ids.contains(&payment.lease_id))
                .cloned()
                .collect();
            payments.sort_by(|a, b| b.due_date.cmp(&a.due_date));
            Ok(payments)
        }

        fn mark_overdue_before(
            &self,
            today: NaiveDate,
        ) -> Result<Vec<PaymentDue>, RepositoryError> {
            let mut guard = self.records.lock().expect("lock");
            let mut flipped = Vec::new();
            for payment in guard.values_mut() {
                if payment.status == PaymentStatus::Pending && payment.due_date < today {
                    payment.status = PaymentStatus::Overdue;
                    flipped.push(payment.clone());
                }
            }
            Ok(flipped)
        }
    }

    #[derive(Default, Clone)]
    pub(super) struct MemoryAuth {
        tokens: Arc<Mutex<HashMap<String, AuthContext>>>,
    }

    impl MemoryAuth {
        pub(super) fn register(&self, token: &str, context: AuthContext) {
            self.tokens
                .lock()
                .expect("lock")
                .insert(token.to_string(), context);
        }
    }

    impl Authenticator for MemoryAuth {
        fn authenticate(&self, token: &str) -> Result<AuthContext, AuthError> {
            self.tokens
                .lock()
                .expect("lock")
                .get(token)
                .cloned()
                .ok_or(AuthError::InvalidToken)
        }
    }

    pub(super) fn landlord() -> AuthContext {
        AuthContext {
            user_id: UserId("landlord-1".to_string()),
            role: UserRole::Landlord,
        }
    }

    pub(super) fn tenant() -> AuthContext {
        AuthContext {
            user_id: UserId("tenant-1".to_string()),
            role: UserRole::Tenant,
        }
    }

    pub(super) fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 15).expect("valid date")
    }

    pub(super) type Service = RentService<MemoryProperties, MemoryLeases, MemoryPayments>;

    pub(super) fn build_service() -> (
        Arc<Service>,
        Arc<MemoryProperties>,
        Arc<MemoryLeases>,
        Arc<MemoryPayments>,
    ) {
        let properties = Arc::new(MemoryProperties::default());
        let leases = Arc::new(MemoryLeases::default());
        let payments = Arc::new(MemoryPayments::default());
        let service = Arc::new(RentService::new(
            properties.clone(),
            leases.clone(),
            payments.clone(),
        ));
        (service, properties, leases, payments)
    }

    /// One landlord-owned property with an active lease for the tenant at
    /// 1200/month, running through the current year.
    pub(super) fn seeded_lease(service: &Service) -> (Property, Lease) {
        let property = service
            .create_property(
                &landlord(),
                NewProperty {
                    name: "Maple Court 2B".to_string(),
                    address: "214 Maple Court, Unit 2B".to_string(),
                },
            )
            .expect("property created");
        let lease = service
            .assign_tenant(
                &landlord(),
                NewLease {
                    tenant_id: tenant().user_id,
                    property_id: property.id.clone(),
                    monthly_rent: 1200,
                    lease_start_date: NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid"),
                    lease_end_date: NaiveDate::from_ymd_opt(2026, 12, 31).expect("valid"),
                },
            )
            .expect("lease created");
        (property, lease)
    }
}

mod scheduling {
    use super::common::*;
    use chrono::NaiveDate;
    use rentease::auth::{AuthContext, UserId, UserRole};
    use rentease::workflows::rent::service::ScheduleRequest;
    use rentease::workflows::rent::{PaymentStatus, RentServiceError};
    use rentease::workflows::store::RepositoryError;

    #[test]
    fn schedule_uses_lease_rent_and_monthly_cadence() {
        let (service, _, _, _) = build_service();
        let (_, lease) = seeded_lease(&service);

        let schedule = service
            .generate_schedule(
                &landlord(),
                ScheduleRequest {
                    lease_id: lease.id.clone(),
                    start_date: NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid"),
                    months: 3,
                },
            )
            .expect("schedule generated");

        assert_eq!(schedule.len(), 3);
        let due_dates: Vec<NaiveDate> = schedule.iter().map(|payment| payment.due_date).collect();
        assert_eq!(
            due_dates,
            vec![
                NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid"),
                NaiveDate::from_ymd_opt(2026, 2, 1).expect("valid"),
                NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid"),
            ]
        );
        assert!(schedule
            .iter()
            .all(|payment| payment.amount == 1200 && payment.status == PaymentStatus::Pending));
        assert!(schedule.iter().all(|payment| !payment.id.0.is_empty()));
    }

    #[test]
    fn only_the_owning_landlord_may_generate_a_schedule() {
        let (service, _, _, _) = build_service();
        let (_, lease) = seeded_lease(&service);
        let other_landlord = AuthContext {
            user_id: UserId("landlord-2".to_string()),
            role: UserRole::Landlord,
        };

        let result = service.generate_schedule(
            &other_landlord,
            ScheduleRequest {
                lease_id: lease.id,
                start_date: today(),
                months: 6,
            },
        );

        assert!(matches!(result, Err(RentServiceError::Forbidden(_))));
    }

    #[test]
    fn zero_month_schedule_is_rejected() {
        let (service, _, _, _) = build_service();
        let (_, lease) = seeded_lease(&service);

        let result = service.generate_schedule(
            &landlord(),
            ScheduleRequest {
                lease_id: lease.id,
                start_date: today(),
                months: 0,
            },
        );

        assert!(matches!(result, Err(RentServiceError::Validation(_))));
    }

    #[test]
    fn second_active_lease_for_same_pair_conflicts() {
        let (service, _, _, _) = build_service();
        let (property, _) = seeded_lease(&service);

        let result = service.assign_tenant(
            &landlord(),
            rentease::workflows::rent::service::NewLease {
                tenant_id: tenant().user_id,
                property_id: property.id,
                monthly_rent: 1250,
                lease_start_date: NaiveDate::from_ymd_opt(2026, 6, 1).expect("valid"),
                lease_end_date: NaiveDate::from_ymd_opt(2027, 5, 31).expect("valid"),
            },
        );

        assert!(matches!(
            result,
            Err(RentServiceError::Repository(RepositoryError::Conflict))
        ));
    }
}

mod payments {
    use super::common::*;
    use chrono::NaiveDate;
    use rentease::auth::{AuthContext, UserId, UserRole};
    use rentease::workflows::rent::repository::PaymentRepository;
    use rentease::workflows::rent::service::{RecordPayment, ScheduleRequest};
    use rentease::workflows::rent::{PaymentStatus, RentServiceError};

    #[test]
    fn recording_a_payment_stamps_details_and_marks_paid() {
        let (service, _, _, payments) = build_service();
        let (_, lease) = seeded_lease(&service);
        let schedule = service
            .generate_schedule(
                &landlord(),
                ScheduleRequest {
                    lease_id: lease.id,
                    start_date: NaiveDate::from_ymd_opt(2026, 8, 1).expect("valid"),
                    months: 1,
                },
            )
            .expect("schedule generated");

        let paid = service
            .record_payment(
                &tenant(),
                RecordPayment {
                    payment_id: schedule[0].id.clone(),
                    payment_method: "bank_transfer".to_string(),
                    transaction_id: Some("txn-42".to_string()),
                    notes: None,
                },
                today(),
            )
            .expect("payment recorded");

        assert_eq!(paid.status, PaymentStatus::Paid);
        assert_eq!(paid.paid_date, Some(today()));
        assert_eq!(paid.payment_method.as_deref(), Some("bank_transfer"));
        let stored = payments
            .fetch(&paid.id)
            .expect("fetch")
            .expect("row present");
        assert_eq!(stored.status, PaymentStatus::Paid);
    }

    #[test]
    fn overdue_obligation_can_still_be_settled() {
        let (service, _, _, payments) = build_service();
        let (_, lease) = seeded_lease(&service);
        let schedule = service
            .generate_schedule(
                &landlord(),
                ScheduleRequest {
                    lease_id: lease.id,
                    start_date: NaiveDate::from_ymd_opt(2026, 7, 1).expect("valid"),
                    months: 1,
                },
            )
            .expect("schedule generated");
        let flipped = payments.mark_overdue_before(today()).expect("sweep");
        assert_eq!(flipped.len(), 1);

        let paid = service
            .record_payment(
                &landlord(),
                RecordPayment {
                    payment_id: schedule[0].id.clone(),
                    payment_method: "cash".to_string(),
                    transaction_id: None,
                    notes: Some("settled in person".to_string()),
                },
                today(),
            )
            .expect("late payment recorded");

        assert_eq!(paid.status, PaymentStatus::Paid);
        assert_eq!(paid.paid_date, Some(today()));
    }

    #[test]
    fn re_recording_a_settled_payment_overwrites_the_details() {
        let (service, _, _, payments) = build_service();
        let (_, lease) = seeded_lease(&service);
        let schedule = service
            .generate_schedule(
                &landlord(),
                ScheduleRequest {
                    lease_id: lease.id,
                    start_date: NaiveDate::from_ymd_opt(2026, 8, 1).expect("valid"),
                    months: 1,
                },
            )
            .expect("schedule generated");
        service
            .record_payment(
                &tenant(),
                RecordPayment {
                    payment_id: schedule[0].id.clone(),
                    payment_method: "bank_transfer".to_string(),
                    transaction_id: Some("txn-42".to_string()),
                    notes: None,
                },
                today(),
            )
            .expect("first recording");

        let corrected = service
            .record_payment(
                &tenant(),
                RecordPayment {
                    payment_id: schedule[0].id.clone(),
                    payment_method: "cash".to_string(),
                    transaction_id: None,
                    notes: Some("corrected at the office".to_string()),
                },
                today(),
            )
            .expect("second recording accepted");

        assert_eq!(corrected.status, PaymentStatus::Paid);
        assert_eq!(corrected.paid_date, Some(today()));
        assert_eq!(corrected.payment_method.as_deref(), Some("cash"));
        let stored = payments
            .fetch(&corrected.id)
            .expect("fetch")
            .expect("row present");
        assert_eq!(stored.payment_method.as_deref(), Some("cash"));
        assert_eq!(stored.transaction_id, None);
    }

    #[test]
    fn outsiders_may_not_record_a_payment() {
        let (service, _, _, _) = build_service();
        let (_, lease) = seeded_lease(&service);
        let schedule = service
            .generate_schedule(
                &landlord(),
                ScheduleRequest {
                    lease_id: lease.id,
                    start_date: today(),
                    months: 1,
                },
            )
            .expect("schedule generated");
        let stranger = AuthContext {
            user_id: UserId("tenant-99".to_string()),
            role: UserRole::Tenant,
        };

        let result = service.record_payment(
            &stranger,
            RecordPayment {
                payment_id: schedule[0].id.clone(),
                payment_method: "cash".to_string(),
                transaction_id: None,
                notes: None,
            },
            today(),
        );

        assert!(matches!(result, Err(RentServiceError::Forbidden(_))));
    }

    #[test]
    fn rent_payments_are_listed_newest_due_first() {
        let (service, _, _, _) = build_service();
        let (_, lease) = seeded_lease(&service);
        service
            .generate_schedule(
                &landlord(),
                ScheduleRequest {
                    lease_id: lease.id,
                    start_date: NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid"),
                    months: 4,
                },
            )
            .expect("schedule generated");

        let listed = service.rent_payments(&tenant()).expect("listing");

        assert_eq!(listed.len(), 4);
        assert!(listed
            .windows(2)
            .all(|pair| pair[0].due_date >= pair[1].due_date));
    }
}

mod dashboard {
    use super::common::*;
    use chrono::NaiveDate;
    use rentease::workflows::rent::repository::PaymentRepository;
    use rentease::workflows::rent::service::{RecordPayment, ScheduleRequest};
    use rentease::workflows::rent::DashboardStats;

    #[test]
    fn landlord_stats_cover_the_current_month() {
        let (service, _, _, payments) = build_service();
        let (_, lease) = seeded_lease(&service);
        let schedule = service
            .generate_schedule(
                &landlord(),
                ScheduleRequest {
                    lease_id: lease.id,
                    start_date: NaiveDate::from_ymd_opt(2026, 7, 1).expect("valid"),
                    months: 2,
                },
            )
            .expect("schedule generated");
        // July row goes overdue, August row gets paid.
        payments.mark_overdue_before(today()).expect("sweep");
        service
            .record_payment(
                &tenant(),
                RecordPayment {
                    payment_id: schedule[1].id.clone(),
                    payment_method: "bank_transfer".to_string(),
                    transaction_id: None,
                    notes: None,
                },
                today(),
            )
            .expect("payment recorded");

        let stats = service
            .dashboard_stats(&landlord(), today())
            .expect("stats");

        match stats {
            DashboardStats::Landlord {
                total_properties,
                active_leases,
                total_rent_expected,
                total_rent_collected,
                pending_payments,
                overdue_payments,
            } => {
                assert_eq!(total_properties, 1);
                assert_eq!(active_leases, 1);
                assert_eq!(total_rent_expected, 1200);
                assert_eq!(total_rent_collected, 1200);
                assert_eq!(pending_payments, 0);
                assert_eq!(overdue_payments, 0);
            }
            other => panic!("expected landlord stats, got {other:?}"),
        }
    }

    #[test]
    fn tenant_stats_surface_next_pending_due_date() {
        let (service, _, _, _) = build_service();
        let (_, lease) = seeded_lease(&service);
        service
            .generate_schedule(
                &landlord(),
                ScheduleRequest {
                    lease_id: lease.id,
                    start_date: NaiveDate::from_ymd_opt(2026, 9, 1).expect("valid"),
                    months: 3,
                },
            )
            .expect("schedule generated");

        let stats = service.dashboard_stats(&tenant(), today()).expect("stats");

        match stats {
            DashboardStats::Tenant {
                active_leases,
                next_payment_due,
                recent_payments,
            } => {
                assert_eq!(active_leases, 1);
                assert_eq!(
                    next_payment_due,
                    Some(NaiveDate::from_ymd_opt(2026, 11, 1).expect("valid"))
                );
                assert_eq!(recent_payments.len(), 3);
            }
            other => panic!("expected tenant stats, got {other:?}"),
        }
    }
}

mod routing {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use rentease::workflows::rent::rent_router;
    use tower::ServiceExt;

    fn build_router() -> axum::Router {
        let (service, _, _, _) = build_service();
        let auth = Arc::new(MemoryAuth::default());
        auth.register("landlord-token", landlord());
        auth.register("tenant-token", tenant());
        rent_router(service, auth)
    }

    #[tokio::test]
    async fn landlord_creates_property_over_http() {
        let router = build_router();
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/property-management?action=properties")
            .header("content-type", "application/json")
            .header("authorization", "Bearer landlord-token")
            .body(Body::from(
                serde_json::to_vec(&json!({
                    "name": "Maple Court 2B",
                    "address": "214 Maple Court, Unit 2B",
                }))
                .expect("serialize"),
            ))
            .expect("request");

        let response = router.oneshot(request).await.expect("router dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(
            payload.get("name").and_then(Value::as_str),
            Some("Maple Court 2B")
        );
        assert!(payload
            .get("id")
            .and_then(Value::as_str)
            .is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn tenant_creating_property_is_forbidden() {
        let router = build_router();
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/property-management?action=properties")
            .header("content-type", "application/json")
            .header("authorization", "Bearer tenant-token")
            .body(Body::from(
                serde_json::to_vec(&json!({ "name": "Nope", "address": "1 Nowhere" }))
                    .expect("serialize"),
            ))
            .expect("request");

        let response = router.oneshot(request).await.expect("router dispatch");

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn requests_without_a_token_are_unauthorized() {
        let router = build_router();
        let request = Request::builder()
            .uri("/api/v1/property-management?action=rent-payments")
            .body(Body::empty())
            .expect("request");

        let response = router.oneshot(request).await.expect("router dispatch");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_body_is_a_bad_request() {
        let router = build_router();
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/property-management?action=properties")
            .header("authorization", "Bearer landlord-token")
            .body(Body::empty())
            .expect("request");

        let response = router.oneshot(request).await.expect("router dispatch");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
