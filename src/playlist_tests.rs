// End-to-end runs of the generation pipeline against mocked platform APIs

use crate::client::MockCatalogApi;
use crate::error::{ApiError, GenerationError, PublishStep, Stage};
use crate::llm::MockLanguageModel;
use crate::models::{AudioFeatures, CreatedPlaylist, TrackCandidate};
use crate::playlist::{GenerationRequest, GenerationSettings, PlaylistGenerator};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    const WORKOUT_REPLY: &str = "MOOD: energetic\n\
        ARTIST_NAMES: none\n\
        KEYWORDS_EN: workout, gym, running, pump up\n\
        KEYWORDS_NATIVE: none\n\
        ENERGY: 0.8\n\
        VALENCE: 0.7\n\
        TEMPO: fast\n\
        GENRES: edm, pop, hip hop";

    fn request(description: &str) -> GenerationRequest {
        GenerationRequest {
            description: description.to_string(),
            user_id: "listener".to_string(),
            access_token: "BQD-token".to_string(),
        }
    }

    fn track(n: usize) -> TrackCandidate {
        TrackCandidate {
            id: format!("t{n}"),
            uri: format!("spotify:track:t{n}"),
            title: format!("Track {n}"),
            primary_artist: format!("Artist {n}"),
        }
    }

    fn track_number(id: &str) -> usize {
        id.trim_start_matches('t').parse().unwrap()
    }

    /// Multiples of 3 miss everything, other evens match fully, odds only match energy
    fn workout_features(id: &str) -> AudioFeatures {
        let n = track_number(id);
        let (energy, valence, tempo) = if n % 3 == 0 {
            (0.1, 0.1, 60.0)
        } else if n % 2 == 0 {
            (0.8, 0.7, 140.0)
        } else {
            (0.75, 0.1, 60.0)
        };
        AudioFeatures {
            id: id.to_string(),
            energy,
            valence,
            tempo,
        }
    }

    fn workout_model() -> MockLanguageModel {
        let mut model = MockLanguageModel::new();
        model
            .expect_complete()
            .withf(|instruction| instruction.contains("upbeat workout music"))
            .times(1)
            .returning(|_| Ok(WORKOUT_REPLY.to_string()));
        model
    }

    /// Each search returns 20 tracks overlapping the previous query's results by 10
    fn expect_overlapping_searches(catalog: &mut MockCatalogApi, log: Arc<Mutex<Vec<String>>>) {
        let calls = AtomicUsize::new(0);
        catalog
            .expect_search_tracks()
            .withf(|_, _, limit| *limit == 20)
            .returning(move |_, query, _| {
                log.lock().unwrap().push(query.to_string());
                let k = calls.fetch_add(1, Ordering::SeqCst);
                Ok((k * 10..k * 10 + 20).map(track).collect())
            });
    }

    fn expect_create(catalog: &mut MockCatalogApi) {
        catalog
            .expect_create_playlist()
            .withf(|session, name, _, public| session.user_id == "listener" && !name.is_empty() && !*public)
            .times(1)
            .returning(|_, name, _, _| {
                Ok(CreatedPlaylist {
                    id: "pl1".to_string(),
                    name: name.to_string(),
                    url: "https://open.spotify.com/playlist/pl1".to_string(),
                })
            });
    }

    #[test]
    fn test_workout_request_end_to_end() {
        let model = workout_model();
        let queries = Arc::new(Mutex::new(Vec::new()));
        let batch_sizes = Arc::new(Mutex::new(Vec::new()));
        let submitted = Arc::new(Mutex::new(Vec::new()));

        let mut catalog = MockCatalogApi::new();
        expect_overlapping_searches(&mut catalog, queries.clone());

        let sizes = batch_sizes.clone();
        catalog
            .expect_audio_features()
            .returning(move |_, ids| {
                sizes.lock().unwrap().push(ids.len());
                Ok(ids.iter().map(|id| workout_features(id)).collect())
            });
        expect_create(&mut catalog);

        let uris = submitted.clone();
        catalog
            .expect_add_tracks()
            .withf(|_, playlist_id, _| playlist_id == "pl1")
            .times(1)
            .returning(move |_, _, added| {
                uris.lock().unwrap().extend(added.iter().cloned());
                Ok(())
            });

        let generator = PlaylistGenerator::new(&catalog, &model, GenerationSettings::default());
        let result = generator.generate(request("upbeat workout music")).unwrap();

        let queries = queries.lock().unwrap();
        assert!(queries.len() <= 10);
        assert_eq!(
            *queries,
            vec![
                "workout",
                "gym",
                "running",
                "pump up",
                "genre:edm",
                "genre:pop",
                "genre:\"hip hop\""
            ]
        );

        // 7 queries of 20 with overlap 10 give 80 unique tracks, fetched as 50 + 30
        let batch_sizes = batch_sizes.lock().unwrap();
        assert!(batch_sizes.iter().all(|size| *size <= 50));
        assert_eq!(*batch_sizes, vec![50, 30]);

        assert_eq!(result.playlist_id, "pl1");
        assert_eq!(result.url, "https://open.spotify.com/playlist/pl1");
        assert_eq!(result.track_count, 30);
        assert_eq!(result.preview.len(), 10);
        assert_eq!(result.preview[0].name, "Track 2");
        assert_eq!(result.preview[0].artist, "Artist 2");
        assert!(result.name.starts_with("Energetic "));

        // 26 full matches in discovery order, then the first energy-only matches
        let submitted = submitted.lock().unwrap();
        assert_eq!(submitted.len(), 30);
        assert_eq!(submitted[0], "spotify:track:t2");
        assert_eq!(submitted[25], "spotify:track:t76");
        assert_eq!(submitted[26], "spotify:track:t1");
        assert_eq!(submitted[29], "spotify:track:t11");
    }

    #[test]
    fn test_artist_queries_are_searched_first() {
        let mut model = MockLanguageModel::new();
        model.expect_complete().returning(|_| {
            Ok("ARTIST_NAMES: Adele, Sam Smith\nKEYWORDS_EN: heartbreak\nGENRES: soul".to_string())
        });

        let queries = Arc::new(Mutex::new(Vec::new()));
        let mut catalog = MockCatalogApi::new();
        expect_overlapping_searches(&mut catalog, queries.clone());
        catalog
            .expect_audio_features()
            .returning(|_, ids| Ok(ids.iter().map(|id| workout_features(id)).collect()));

        let generator = PlaylistGenerator::new(&catalog, &model, GenerationSettings::default());
        generator.preview(request("songs after a breakup")).unwrap();

        assert_eq!(
            *queries.lock().unwrap(),
            vec!["Adele", "Sam Smith", "heartbreak", "genre:soul"]
        );
    }

    #[test]
    fn test_create_failure_skips_track_submission() {
        let model = workout_model();
        let mut catalog = MockCatalogApi::new();
        expect_overlapping_searches(&mut catalog, Arc::new(Mutex::new(Vec::new())));
        catalog
            .expect_audio_features()
            .returning(|_, ids| Ok(ids.iter().map(|id| workout_features(id)).collect()));
        catalog
            .expect_create_playlist()
            .times(1)
            .returning(|_, _, _, _| {
                Err(ApiError::Status {
                    status: 403,
                    message: "Insufficient client scope".to_string(),
                })
            });
        catalog.expect_add_tracks().times(0);

        let generator = PlaylistGenerator::new(&catalog, &model, GenerationSettings::default());
        let err = generator.generate(request("upbeat workout music")).unwrap_err();

        assert_eq!(err.stage(), Stage::Publishing);
        match err {
            GenerationError::PublishFailed {
                step,
                playlist_id,
                source,
            } => {
                assert_eq!(step, PublishStep::Create);
                assert!(playlist_id.is_none());
                assert_eq!(source.status(), Some(403));
            }
            other => panic!("expected PublishFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_add_failure_reports_created_playlist() {
        let model = workout_model();
        let mut catalog = MockCatalogApi::new();
        expect_overlapping_searches(&mut catalog, Arc::new(Mutex::new(Vec::new())));
        catalog
            .expect_audio_features()
            .returning(|_, ids| Ok(ids.iter().map(|id| workout_features(id)).collect()));
        expect_create(&mut catalog);
        catalog
            .expect_add_tracks()
            .times(1)
            .returning(|_, _, _| Err(ApiError::Transport("connection reset".to_string())));

        let generator = PlaylistGenerator::new(&catalog, &model, GenerationSettings::default());
        let err = generator.generate(request("upbeat workout music")).unwrap_err();

        match err {
            GenerationError::PublishFailed {
                step, playlist_id, ..
            } => {
                assert_eq!(step, PublishStep::AddTracks);
                assert_eq!(playlist_id.as_deref(), Some("pl1"));
            }
            other => panic!("expected PublishFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_input_makes_no_external_calls() {
        let mut model = MockLanguageModel::new();
        model.expect_complete().times(0);
        let mut catalog = MockCatalogApi::new();
        catalog.expect_search_tracks().times(0);
        catalog.expect_create_playlist().times(0);

        let generator = PlaylistGenerator::new(&catalog, &model, GenerationSettings::default());

        let err = generator.generate(request("   ")).unwrap_err();
        assert!(matches!(err, GenerationError::InputInvalid(_)));
        assert_eq!(err.stage(), Stage::Authorizing);

        let mut no_token = request("rainy day");
        no_token.access_token = String::new();
        assert!(matches!(
            generator.generate(no_token),
            Err(GenerationError::InputInvalid(_))
        ));

        let mut no_user = request("rainy day");
        no_user.user_id = " ".to_string();
        assert!(matches!(
            generator.generate(no_user),
            Err(GenerationError::InputInvalid(_))
        ));
    }

    #[test]
    fn test_model_failure_aborts_before_search() {
        let mut model = MockLanguageModel::new();
        model.expect_complete().times(1).returning(|_| {
            Err(ApiError::Status {
                status: 529,
                message: "Overloaded".to_string(),
            })
        });
        let mut catalog = MockCatalogApi::new();
        catalog.expect_search_tracks().times(0);

        let generator = PlaylistGenerator::new(&catalog, &model, GenerationSettings::default());
        let err = generator.generate(request("rainy day")).unwrap_err();

        assert!(matches!(err, GenerationError::UpstreamUnavailable(_)));
        assert_eq!(err.stage(), Stage::Interpreting);
        assert!(err.to_string().contains("Overloaded"));
    }

    #[test]
    fn test_empty_search_results_fail_without_publishing() {
        let model = workout_model();
        let mut catalog = MockCatalogApi::new();
        catalog
            .expect_search_tracks()
            .times(7)
            .returning(|_, _, _| Ok(Vec::new()));
        catalog.expect_audio_features().times(0);
        catalog.expect_create_playlist().times(0);

        let generator = PlaylistGenerator::new(&catalog, &model, GenerationSettings::default());
        let err = generator.generate(request("upbeat workout music")).unwrap_err();

        assert!(matches!(err, GenerationError::NoCandidatesFound { queries: 7 }));
        assert_eq!(err.stage(), Stage::Searching);
    }

    #[test]
    fn test_unparsable_reply_searches_by_default_mood() {
        let mut model = MockLanguageModel::new();
        model
            .expect_complete()
            .returning(|_| Ok("Sure! Here are some great songs for you.".to_string()));

        let queries = Arc::new(Mutex::new(Vec::new()));
        let mut catalog = MockCatalogApi::new();
        expect_overlapping_searches(&mut catalog, queries.clone());
        catalog
            .expect_audio_features()
            .returning(|_, ids| Ok(ids.iter().map(|id| workout_features(id)).collect()));
        expect_create(&mut catalog);
        catalog.expect_add_tracks().times(1).returning(|_, _, _| Ok(()));

        let generator = PlaylistGenerator::new(&catalog, &model, GenerationSettings::default());
        let result = generator.generate(request("something nice")).unwrap();

        assert_eq!(*queries.lock().unwrap(), vec!["chill"]);
        assert!(result.name.starts_with("Chill "));
        assert!(result.track_count > 0);
    }

    #[test]
    fn test_failed_feature_batches_fall_back_to_search_order() {
        let model = workout_model();
        let submitted = Arc::new(Mutex::new(Vec::new()));

        let mut catalog = MockCatalogApi::new();
        expect_overlapping_searches(&mut catalog, Arc::new(Mutex::new(Vec::new())));
        catalog
            .expect_audio_features()
            .times(2)
            .returning(|_, _| Err(ApiError::Transport("timed out".to_string())));
        expect_create(&mut catalog);

        let uris = submitted.clone();
        catalog
            .expect_add_tracks()
            .times(1)
            .returning(move |_, _, added| {
                uris.lock().unwrap().extend(added.iter().cloned());
                Ok(())
            });

        let generator = PlaylistGenerator::new(&catalog, &model, GenerationSettings::default());
        let result = generator.generate(request("upbeat workout music")).unwrap();

        assert_eq!(result.track_count, 30);
        let expected: Vec<String> = (0..30).map(|n| format!("spotify:track:t{n}")).collect();
        assert_eq!(*submitted.lock().unwrap(), expected);
    }

    #[test]
    fn test_dry_run_never_touches_the_library() {
        let model = workout_model();
        let mut catalog = MockCatalogApi::new();
        expect_overlapping_searches(&mut catalog, Arc::new(Mutex::new(Vec::new())));
        catalog
            .expect_audio_features()
            .returning(|_, ids| Ok(ids.iter().map(|id| workout_features(id)).collect()));
        catalog.expect_create_playlist().times(0);
        catalog.expect_add_tracks().times(0);

        let generator = PlaylistGenerator::new(&catalog, &model, GenerationSettings::default());
        let draft = generator.preview(request("upbeat workout music")).unwrap();

        assert_eq!(draft.tracks.len(), 30);
        assert!(draft.tracks.windows(2).all(|pair| pair[0].score >= pair[1].score));
        assert!(draft.description.contains("upbeat workout music"));
    }

    #[test]
    fn test_custom_settings_shrink_the_playlist() {
        let model = workout_model();
        let submitted = Arc::new(Mutex::new(0usize));

        let mut catalog = MockCatalogApi::new();
        expect_overlapping_searches(&mut catalog, Arc::new(Mutex::new(Vec::new())));
        catalog
            .expect_audio_features()
            .withf(|_, ids| ids.len() <= 20)
            .returning(|_, ids| Ok(ids.iter().map(|id| workout_features(id)).collect()));
        expect_create(&mut catalog);

        let count = submitted.clone();
        catalog.expect_add_tracks().returning(move |_, _, added| {
            *count.lock().unwrap() = added.len();
            Ok(())
        });

        let settings = GenerationSettings {
            feature_batch_size: 20,
            candidate_limit: 40,
            max_tracks: 12,
            preview_size: 3,
            ..GenerationSettings::default()
        };
        let generator = PlaylistGenerator::new(&catalog, &model, settings);
        let result = generator.generate(request("upbeat workout music")).unwrap();

        assert_eq!(result.track_count, 12);
        assert_eq!(result.preview.len(), 3);
        assert_eq!(*submitted.lock().unwrap(), 12);
    }
}
