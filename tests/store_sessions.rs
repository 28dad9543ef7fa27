// crates.io
use time::{Duration, OffsetDateTime};
// self
use seo_gateway::{
	auth::{Session, SessionId, SiteId},
	store::{MemoryStore, SessionStore},
};

fn session(token: &str, expires_in: Duration) -> Session {
	Session::builder(
		SessionId::generate(),
		SiteId::new("site-1").expect("Site fixture should be valid."),
	)
	.access_token(token)
	.expires_in(expires_in)
	.build()
	.expect("Session fixture should build.")
}

#[tokio::test]
async fn save_fetch_delete_round_trip() {
	let store = MemoryStore::default();
	let session = session("tok-1", Duration::hours(1));

	store.save(session.clone()).await.expect("Save should succeed.");

	let fetched = store
		.fetch(&session.id)
		.await
		.expect("Fetch should succeed.")
		.expect("Saved session should be present.");

	assert_eq!(fetched.access_token.expose(), "tok-1");

	store.delete(&session.id).await.expect("Delete should succeed.");

	assert!(store.fetch(&session.id).await.expect("Fetch should succeed.").is_none());

	// Deleting again is not an error.
	store.delete(&session.id).await.expect("Repeated delete should succeed.");
}

#[tokio::test]
async fn find_by_token_matches_the_exact_secret() {
	let store = MemoryStore::default();
	let session = session("tok-exact", Duration::hours(1));

	store.save(session.clone()).await.expect("Save should succeed.");

	let found = store
		.find_by_token("tok-exact")
		.await
		.expect("Lookup should succeed.")
		.expect("Session should be found by token.");

	assert_eq!(found.id, session.id);
	assert!(store.find_by_token("tok-exact-2").await.expect("Lookup should succeed.").is_none());
}

#[tokio::test]
async fn save_replaces_records_with_the_same_identifier() {
	let store = MemoryStore::default();
	let original = session("tok-old", Duration::hours(1));
	let replacement = Session::builder(original.id.clone(), original.site.clone())
		.access_token("tok-new")
		.expires_in(Duration::hours(2))
		.build()
		.expect("Replacement fixture should build.");

	store.save(original.clone()).await.expect("Save should succeed.");
	store.save(replacement).await.expect("Replacement save should succeed.");

	let fetched = store
		.fetch(&original.id)
		.await
		.expect("Fetch should succeed.")
		.expect("Session should be present.");

	assert_eq!(fetched.access_token.expose(), "tok-new");
}

#[tokio::test]
async fn sweep_removes_only_expired_sessions() {
	let store = MemoryStore::default();
	let live = session("tok-live", Duration::hours(1));
	let expired = Session::builder(
		SessionId::generate(),
		SiteId::new("site-1").expect("Site fixture should be valid."),
	)
	.access_token("tok-stale")
	.created_at(OffsetDateTime::now_utc() - Duration::hours(48))
	.expires_in(Duration::hours(1))
	.build()
	.expect("Expired fixture should build.");
	let expired_id = expired.id.clone();

	store.save(live.clone()).await.expect("Save should succeed.");
	store.save(expired).await.expect("Save should succeed.");

	let purged = store.sweep(OffsetDateTime::now_utc()).await.expect("Sweep should succeed.");

	assert_eq!(purged, 1);
	assert!(store.fetch(&expired_id).await.expect("Fetch should succeed.").is_none());
	assert!(store.fetch(&live.id).await.expect("Fetch should succeed.").is_some());
}
