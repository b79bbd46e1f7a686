use super::*;
use tempfile::tempdir;

fn new_track(title: &str, artist: &str) -> NewTrack {
    NewTrack {
        title: title.into(),
        artist: artist.into(),
        artist_id: Some(artist.to_lowercase()),
        ..NewTrack::default()
    }
}

#[test]
fn object_path_accepts_bare_paths_and_strips_url_prefixes() {
    assert_eq!(
        object_path(Bucket::Tracks, "u1/123_song.mp3").as_deref(),
        Some("u1/123_song.mp3")
    );
    assert_eq!(
        object_path(
            Bucket::Tracks,
            "https://x.supabase.co/storage/v1/object/public/tracks/u1/123_song.mp3"
        )
        .as_deref(),
        Some("u1/123_song.mp3")
    );
    assert_eq!(
        object_path(
            Bucket::Covers,
            "https://x.supabase.co/storage/v1/object/sign/covers/u1/c.png?token=abc"
        )
        .as_deref(),
        Some("u1/c.png")
    );
    assert_eq!(object_path(Bucket::Covers, "   "), None);
}

#[test]
fn object_path_rejects_urls_outside_the_bucket() {
    let url = "https://x.supabase.co/storage/v1/object/public/covers/u1/c.png";
    assert_eq!(object_path(Bucket::Tracks, url), None);
    assert_eq!(object_path(Bucket::Tracks, "https://cdn.example.com/song.mp3"), None);
    assert_eq!(object_path(Bucket::Covers, "file:///tmp/c.png"), None);
}

#[test]
fn insert_assigns_increasing_ids_and_survives_reopen() {
    let dir = tempdir().unwrap();
    {
        let mut store = LocalStore::open(dir.path(), None).unwrap();
        let a = store.insert_track(new_track("Alpha", "Ann")).unwrap();
        let b = store.insert_track(new_track("Beta", "Bob")).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    let mut store = LocalStore::open(dir.path(), None).unwrap();
    let all = store.list_tracks(&TrackQuery::default()).unwrap();
    assert_eq!(all.len(), 2);
    let c = store.insert_track(new_track("Gamma", "Cid")).unwrap();
    assert_eq!(c.id, 3);
}

#[test]
fn list_filters_by_title_or_artist_case_insensitive() {
    let dir = tempdir().unwrap();
    let mut store = LocalStore::open(dir.path(), None).unwrap();
    store.insert_track(new_track("Night Drive", "Ann")).unwrap();
    store.insert_track(new_track("Morning", "Knightly")).unwrap();
    store.insert_track(new_track("Noon", "Bob")).unwrap();

    let hits = store
        .list_tracks(&TrackQuery::search("NIGHT").ordered(TrackOrder::Title))
        .unwrap();
    let titles: Vec<&str> = hits.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Morning", "Night Drive"]);

    let by_bob = store.list_tracks(&TrackQuery::default().for_artist("bob")).unwrap();
    assert_eq!(by_bob.len(), 1);
    assert_eq!(by_bob[0].title, "Noon");
}

#[test]
fn newest_first_breaks_timestamp_ties_by_id() {
    let dir = tempdir().unwrap();
    let mut store = LocalStore::open(dir.path(), None).unwrap();
    store.insert_track(new_track("First", "A")).unwrap();
    store.insert_track(new_track("Second", "A")).unwrap();

    let rows = store.list_tracks(&TrackQuery::default()).unwrap();
    assert_eq!(rows[0].title, "Second");
    assert_eq!(rows[1].title, "First");
}

#[test]
fn update_and_delete_report_missing_rows() {
    let dir = tempdir().unwrap();
    let mut store = LocalStore::open(dir.path(), None).unwrap();
    let row = store.insert_track(new_track("Old", "Ann")).unwrap();

    let updated = store
        .update_track(
            row.id,
            TrackUpdate {
                title: Some("New".into()),
                genre: Some(Some("ambient".into())),
                ..TrackUpdate::default()
            },
        )
        .unwrap();
    assert_eq!(updated.title, "New");
    assert_eq!(updated.artist, "Ann");
    assert_eq!(updated.genre.as_deref(), Some("ambient"));

    store.delete_track(row.id).unwrap();
    assert!(matches!(store.get_track(row.id), Err(StoreError::NotFound(_))));
    assert!(matches!(
        store.delete_track(row.id),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn upload_writes_objects_and_rejects_escaping_paths() {
    let dir = tempdir().unwrap();
    let mut store = LocalStore::open(dir.path(), None).unwrap();

    let stored = store
        .upload(Bucket::Tracks, "ann/1_song.mp3", b"bytes")
        .unwrap();
    assert_eq!(stored, "ann/1_song.mp3");
    assert_eq!(
        std::fs::read(store.root().join("tracks/ann/1_song.mp3")).unwrap(),
        b"bytes"
    );

    assert!(matches!(
        store.upload(Bucket::Tracks, "../outside.mp3", b"x"),
        Err(StoreError::InvalidPath(_))
    ));
    assert!(matches!(
        store.upload(Bucket::Covers, "/etc/passwd", b"x"),
        Err(StoreError::InvalidPath(_))
    ));
}

#[test]
fn remove_ignores_missing_objects() {
    let dir = tempdir().unwrap();
    let mut store = LocalStore::open(dir.path(), None).unwrap();
    store.upload(Bucket::Covers, "a/c.png", b"png").unwrap();

    store
        .remove(
            Bucket::Covers,
            &["a/c.png".to_string(), "a/missing.png".to_string()],
        )
        .unwrap();
    assert!(!store.root().join("covers/a/c.png").exists());
}

#[test]
fn public_url_uses_hosted_base_when_configured() {
    let dir = tempdir().unwrap();
    let hosted = LocalStore::open(dir.path(), Some("https://cdn.example.com/".into())).unwrap();
    assert_eq!(
        hosted.public_url(Bucket::Covers, "a/c.png"),
        "https://cdn.example.com/storage/v1/object/public/covers/a/c.png"
    );

    let local = LocalStore::open(dir.path(), None).unwrap();
    let url = local.public_url(Bucket::Tracks, "a/s.mp3");
    assert!(url.starts_with("file://"));
    assert!(url.ends_with("tracks/a/s.mp3"));
}

#[test]
fn corrupt_catalog_is_a_decode_error() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("catalog.toml"), "tracks = 7 = nope").unwrap();
    assert!(matches!(
        LocalStore::open(dir.path(), None),
        Err(StoreError::Decode(_))
    ));
}

fn block_catalog_writes(store: &LocalStore) {
    std::fs::create_dir(store.root().join("catalog.toml.tmp")).unwrap();
}

fn unblock_catalog_writes(store: &LocalStore) {
    std::fs::remove_dir(store.root().join("catalog.toml.tmp")).unwrap();
}

#[test]
fn failed_write_leaves_catalog_untouched() {
    let dir = tempdir().unwrap();
    let mut store = LocalStore::open(dir.path(), None).unwrap();
    let kept = store.insert_track(new_track("Kept", "Ann")).unwrap();
    let before = store.list_tracks(&TrackQuery::default()).unwrap();

    block_catalog_writes(&store);
    assert!(matches!(
        store.insert_track(new_track("Lost", "Ann")),
        Err(StoreError::Io(_))
    ));
    assert!(
        store
            .update_track(
                kept.id,
                TrackUpdate {
                    title: Some("Renamed".into()),
                    ..TrackUpdate::default()
                }
            )
            .is_err()
    );
    assert!(store.delete_track(kept.id).is_err());
    assert!(store.insert_playlist(NewPlaylist::default()).is_err());
    assert_eq!(store.list_tracks(&TrackQuery::default()).unwrap(), before);
    assert!(store.list_playlists().unwrap().is_empty());

    // The failed insert did not use up an id.
    unblock_catalog_writes(&store);
    let next = store.insert_track(new_track("Next", "Ann")).unwrap();
    assert_eq!(next.id, kept.id + 1);

    let reopened = LocalStore::open(dir.path(), None).unwrap();
    let titles: Vec<String> = reopened
        .list_tracks(&TrackQuery::default().ordered(TrackOrder::Title))
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["Kept", "Next"]);
}

fn new_playlist(name: &str) -> NewPlaylist {
    NewPlaylist {
        name: name.into(),
        ..NewPlaylist::default()
    }
}

#[test]
fn playlists_list_newest_first_and_survive_reopen() {
    let dir = tempdir().unwrap();
    {
        let mut store = LocalStore::open(dir.path(), None).unwrap();
        let a = store.insert_playlist(new_playlist("Evening")).unwrap();
        let b = store
            .insert_playlist(NewPlaylist {
                name: "Morning".into(),
                description: Some("coffee".into()),
                cover_path: Some("u1/1_sun.png".into()),
            })
            .unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert!(b.track_ids.is_empty());
    }

    let store = LocalStore::open(dir.path(), None).unwrap();
    let names: Vec<String> = store
        .list_playlists()
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Morning", "Evening"]);
    assert_eq!(
        store.get_playlist(2).unwrap().description.as_deref(),
        Some("coffee")
    );
    assert!(matches!(
        store.get_playlist(9),
        Err(StoreError::PlaylistNotFound(9))
    ));
}

#[test]
fn playlist_tracks_keep_insertion_order() {
    let dir = tempdir().unwrap();
    let mut store = LocalStore::open(dir.path(), None).unwrap();
    let a = store.insert_track(new_track("Alpha", "Ann")).unwrap();
    let b = store.insert_track(new_track("Beta", "Bob")).unwrap();
    let c = store.insert_track(new_track("Gamma", "Cid")).unwrap();
    let list = store.insert_playlist(new_playlist("Mix")).unwrap();

    for id in [c.id, a.id, b.id, a.id] {
        store.add_playlist_track(list.id, id).unwrap();
    }
    let titles: Vec<String> = store
        .playlist_tracks(list.id)
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["Gamma", "Alpha", "Beta"]);

    let after = store.remove_playlist_track(list.id, a.id).unwrap();
    assert_eq!(after.track_ids, vec![c.id, b.id]);
    // Removing a non-member is fine.
    store.remove_playlist_track(list.id, a.id).unwrap();
}

#[test]
fn playlist_membership_requires_existing_rows() {
    let dir = tempdir().unwrap();
    let mut store = LocalStore::open(dir.path(), None).unwrap();
    let track = store.insert_track(new_track("Alpha", "Ann")).unwrap();
    let list = store.insert_playlist(new_playlist("Mix")).unwrap();

    assert!(matches!(
        store.add_playlist_track(list.id, 42),
        Err(StoreError::NotFound(42))
    ));
    assert!(matches!(
        store.add_playlist_track(7, track.id),
        Err(StoreError::PlaylistNotFound(7))
    ));
    assert!(matches!(
        store.playlist_tracks(7),
        Err(StoreError::PlaylistNotFound(7))
    ));
}

#[test]
fn deleting_a_track_removes_it_from_playlists() {
    let dir = tempdir().unwrap();
    let mut store = LocalStore::open(dir.path(), None).unwrap();
    let a = store.insert_track(new_track("Alpha", "Ann")).unwrap();
    let b = store.insert_track(new_track("Beta", "Bob")).unwrap();
    let list = store.insert_playlist(new_playlist("Mix")).unwrap();
    store.add_playlist_track(list.id, a.id).unwrap();
    store.add_playlist_track(list.id, b.id).unwrap();

    store.delete_track(a.id).unwrap();
    assert_eq!(store.get_playlist(list.id).unwrap().track_ids, vec![b.id]);

    store.delete_playlist(list.id).unwrap();
    assert!(store.list_playlists().unwrap().is_empty());
    assert!(store.get_track(b.id).is_ok());
}

#[test]
fn open_creates_every_bucket() {
    let dir = tempdir().unwrap();
    let store = LocalStore::open(dir.path(), None).unwrap();
    for bucket in Bucket::ALL {
        assert!(store.root().join(bucket.name()).is_dir());
    }
    assert_eq!(Bucket::PlaylistCovers.to_string(), "playlist-covers");
}
