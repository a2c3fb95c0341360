use mongodb::{
    bson::{doc, to_document},
    options::UpdateOptions,
    Client,
};
use rocket::{form::Form, serde::json::Json, Route, State};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            auth::AuthToken,
            candidate::{CandidateDesc, CandidateForm, MemberListing},
            voter::{RosterImportSummary, StudentRecord},
        },
        common::ballot::CandidateNumber,
        db::{
            admin::Admin,
            candidate::Candidate,
            member::Member,
            voter::{StudentProfile, Voter},
        },
        mongodb::{Coll, Id},
    },
    storage::ImageStore,
};

use super::common::candidates_with_members;

pub fn routes() -> Vec<Route> {
    routes![
        get_candidates,
        create_candidate,
        update_candidate,
        delete_candidate,
        get_members,
        import_voters,
    ]
}

#[get("/admin/candidates")]
async fn get_candidates(
    _token: AuthToken<Admin>,
    candidates: Coll<Candidate>,
    members: Coll<Member>,
    db_client: &State<Client>,
) -> Result<Json<Vec<CandidateDesc>>> {
    let mut session = db_client.start_session(None).await?;
    let all = candidates_with_members(None, &candidates, &members, &mut session).await?;
    Ok(Json(all))
}

#[post("/admin/candidates", data = "<form>")]
async fn create_candidate(
    _token: AuthToken<Admin>,
    form: Form<CandidateForm<'_>>,
    candidates: Coll<Candidate>,
    members: Coll<Member>,
    images: &State<ImageStore>,
    db_client: &State<Client>,
) -> Result<Json<CandidateDesc>> {
    let mut form = form.into_inner();
    form.validate()?;
    ensure_number_free(form.number, None, &candidates).await?;

    // Images go first: if one cannot be written, nothing is stored.
    let logo_url = save_logo(&mut form, images).await?;
    let member_images = save_member_photos(&mut form, images).await?;

    let candidate = Candidate {
        id: Id::new(),
        candidate: form.to_candidate(logo_url),
    };
    let new_members = form
        .member_specs()
        .iter()
        .zip(member_images)
        .map(|(spec, image_url)| Member {
            id: Id::new(),
            member: spec.to_member(candidate.id, image_url),
        })
        .collect::<Vec<_>>();

    // Atomically insert the candidate and its members.
    {
        let mut session = db_client.start_session(None).await?;
        session.start_transaction(None).await?;

        candidates
            .insert_one_with_session(&candidate, None, &mut session)
            .await
            .map_err(|e| Error::from_write(e, format!("party number {}", candidate.number)))?;
        if !new_members.is_empty() {
            members
                .insert_many_with_session(&new_members, None, &mut session)
                .await
                .map_err(|e| Error::from_write(e, "member student ID"))?;
        }

        session
            .commit_transaction()
            .await
            .map_err(|e| Error::from_write(e, "party number or member student ID"))?;
    }
    info!(
        "Created candidate {} ({}) with {} members",
        candidate.number,
        candidate.name,
        new_members.len()
    );

    reload(candidate.id, &candidates, &members, db_client).await
}

#[put("/admin/candidates?<id>", data = "<form>")]
async fn update_candidate(
    _token: AuthToken<Admin>,
    id: Id,
    form: Form<CandidateForm<'_>>,
    candidates: Coll<Candidate>,
    members: Coll<Member>,
    images: &State<ImageStore>,
    db_client: &State<Client>,
) -> Result<Json<CandidateDesc>> {
    let mut form = form.into_inner();
    form.validate()?;

    // Get the existing candidate.
    let existing = candidates
        .find_one(id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Candidate {id}")))?;
    if let Some(revision) = form.revision {
        if revision != existing.revision {
            return Err(stale(id));
        }
    }
    ensure_number_free(form.number, Some(id), &candidates).await?;

    // A new logo replaces the old one; otherwise the old one stays.
    let logo_url = save_logo(&mut form, images)
        .await?
        .or_else(|| existing.logo_url.clone());
    let member_images = save_member_photos(&mut form, images).await?;

    let mut updated = form.to_candidate(logo_url);
    if form.missions.is_none() {
        updated.missions = existing.missions.clone();
    }
    if form.policies.is_none() {
        updated.policies = existing.policies.clone();
    }
    let mut fields = to_document(&updated)?;
    fields.remove("score");
    fields.remove("revision");

    {
        let mut session = db_client.start_session(None).await?;
        session.start_transaction(None).await?;

        // Only apply the update if nobody else has edited since we read it.
        let unchanged = doc! {
            "_id": id,
            "revision": i64::from(existing.revision),
        };
        let update = doc! {
            "$set": fields,
            "$inc": { "revision": 1 },
        };
        let result = candidates
            .update_one_with_session(unchanged, update, None, &mut session)
            .await
            .map_err(|e| Error::from_write(e, format!("party number {}", updated.number)))?;
        if result.matched_count != 1 {
            return Err(stale(id));
        }

        // Reconcile members by student ID, so kept members keep their identity.
        let submitted = form
            .member_specs()
            .iter()
            .map(|spec| spec.student_id.trim().to_string())
            .collect::<Vec<_>>();
        let removed = doc! {
            "candidate_id": id,
            "student_id": { "$nin": submitted },
        };
        members
            .delete_many_with_session(removed, None, &mut session)
            .await?;

        let upsert = UpdateOptions::builder().upsert(true).build();
        for (spec, image_url) in form.member_specs().iter().zip(member_images) {
            let member = spec.to_member(id, image_url);
            let filter = doc! {
                "candidate_id": id,
                "student_id": &member.student_id,
            };
            // New members get their ID here so stored order follows submission order.
            let update = doc! {
                "$set": {
                    "name": &member.name,
                    "position": &member.position,
                    "image_url": &member.image_url,
                },
                "$setOnInsert": {
                    "_id": Id::new(),
                },
            };
            members
                .update_one_with_session(filter, update, upsert.clone(), &mut session)
                .await
                .map_err(|e| {
                    Error::from_write(e, format!("member student ID {}", member.student_id))
                })?;
        }

        session
            .commit_transaction()
            .await
            .map_err(|e| Error::from_write(e, "party number or member student ID"))?;
    }
    info!("Updated candidate {id} (party {})", updated.number);

    reload(id, &candidates, &members, db_client).await
}

/// Delete a candidate, its members, and every ballot cast for it. Voters
/// whose ballot is cleared may vote again.
#[delete("/admin/candidates?<id>")]
async fn delete_candidate(
    _token: AuthToken<Admin>,
    id: Id,
    candidates: Coll<Candidate>,
    members: Coll<Member>,
    voters: Coll<Voter>,
    db_client: &State<Client>,
) -> Result<()> {
    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    let chose_candidate = doc! {
        "candidate_id": id,
    };
    let clear_ballot = doc! {
        "$set": {
            "is_voted": false,
            "candidate_id": null,
        }
    };
    let cleared = voters
        .update_many_with_session(chose_candidate.clone(), clear_ballot, None, &mut session)
        .await
        .map_err(|e| Error::from_write(e, "ballot"))?;

    let removed = members
        .delete_many_with_session(chose_candidate, None, &mut session)
        .await
        .map_err(|e| Error::from_write(e, "member"))?;

    let result = candidates
        .delete_one_with_session(id.as_doc(), None, &mut session)
        .await
        .map_err(|e| Error::from_write(e, "candidate"))?;
    if result.deleted_count != 1 {
        return Err(Error::not_found(format!("Candidate {id}")));
    }

    session
        .commit_transaction()
        .await
        .map_err(|e| Error::from_write(e, "candidate"))?;
    info!(
        "Deleted candidate {id}: cleared {} ballots, removed {} members",
        cleared.modified_count, removed.deleted_count
    );

    Ok(())
}

/// Every member of every party, ordered by party number.
#[get("/admin/members")]
async fn get_members(
    _token: AuthToken<Admin>,
    candidates: Coll<Candidate>,
    members: Coll<Member>,
    db_client: &State<Client>,
) -> Result<Json<Vec<MemberListing>>> {
    let mut session = db_client.start_session(None).await?;
    let all = candidates_with_members(None, &candidates, &members, &mut session).await?;
    Ok(Json(MemberListing::from_candidates(all)))
}

/// Load or refresh the voter roster. Profiles are replaced; whether and how
/// a student has voted is never touched.
#[post("/admin/voters", data = "<records>", format = "json")]
async fn import_voters(
    _token: AuthToken<Admin>,
    records: Json<Vec<StudentRecord>>,
    voters: Coll<Voter>,
) -> Result<Json<RosterImportSummary>> {
    // Check the whole roster before writing any of it.
    let profiles = records
        .into_inner()
        .into_iter()
        .map(StudentProfile::try_from)
        .collect::<Result<Vec<_>>>()?;

    let upsert = UpdateOptions::builder().upsert(true).build();
    let mut summary = RosterImportSummary::default();
    for profile in profiles {
        let filter = doc! {
            "student_id": &profile.student_id,
        };
        let update = doc! {
            "$set": to_document(&profile)?,
            "$setOnInsert": {
                "is_voted": false,
                "candidate_id": null,
                "is_form_completed": false,
            },
        };
        let result = voters
            .update_one(filter, update, upsert.clone())
            .await
            .map_err(|e| Error::from_write(e, format!("student {}", profile.student_id)))?;
        if result.upserted_id.is_some() {
            summary.created += 1;
        } else {
            summary.updated += 1;
        }
    }
    info!(
        "Roster import: {} created, {} updated",
        summary.created, summary.updated
    );

    Ok(Json(summary))
}

/// Fail with a conflict if another candidate already runs under `number`.
/// Member photos are stored by party number, so this must pass before any
/// image is written.
async fn ensure_number_free(
    number: CandidateNumber,
    except: Option<Id>,
    candidates: &Coll<Candidate>,
) -> Result<()> {
    let mut taken = doc! { "number": number };
    if let Some(id) = except {
        taken.insert("_id", doc! { "$ne": id });
    }
    if candidates.find_one(taken, None).await?.is_some() {
        return Err(Error::conflict(format!("Duplicate: party number {number}")));
    }
    Ok(())
}

fn stale(id: Id) -> Error {
    Error::conflict(format!(
        "Candidate {id} was changed by someone else; reload and try again"
    ))
}

/// Fetch a candidate with its members after a write.
async fn reload(
    id: Id,
    candidates: &Coll<Candidate>,
    members: &Coll<Member>,
    db_client: &Client,
) -> Result<Json<CandidateDesc>> {
    let mut session = db_client.start_session(None).await?;
    candidates_with_members(id.as_doc(), candidates, members, &mut session)
        .await?
        .pop()
        .map(Json)
        .ok_or_else(|| Error::not_found(format!("Candidate {id}")))
}

/// Store the uploaded logo, if there is one.
async fn save_logo(form: &mut CandidateForm<'_>, images: &ImageStore) -> Result<Option<String>> {
    match form.file.as_mut() {
        Some(file) if file.len() > 0 => Ok(Some(images.save_logo(&form.name, file).await?)),
        _ => Ok(None),
    }
}

/// Store uploaded member photos, returning each submitted member's image
/// URL in submission order. Members without a new photo keep the URL they
/// were submitted with.
async fn save_member_photos(
    form: &mut CandidateForm<'_>,
    images: &ImageStore,
) -> Result<Vec<String>> {
    let specs = form.members.as_ref().map_or(&[][..], |members| members.as_slice());
    let mut urls = Vec::with_capacity(specs.len());
    for spec in specs {
        let url = match form.member_files.get_mut(spec.student_id.trim()) {
            Some(file) if file.len() > 0 => {
                images
                    .save_member_photo(form.number, spec.position.trim(), file)
                    .await?
            }
            _ => spec.existing_image_url.clone().unwrap_or_default(),
        };
        urls.push(url);
    }
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use mongodb::Database;
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::{Client, LocalResponse},
        serde::json::serde_json::{self, json},
    };

    use crate::model::{
        api::{auth::VoterLogin, candidate::MemberSpec},
        common::position::POSITIONS,
        db::voter::NewVoter,
    };

    use super::*;

    const BOUNDARY: &str = "X-COUNCIL-VOTE-BOUNDARY";

    /// A multipart form body with the given text fields and JPEG files.
    fn multipart(fields: &[(&str, String)], files: &[(&str, &[u8])]) -> (ContentType, Vec<u8>) {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        for (name, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"photo.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        let content_type = ContentType::new("multipart", "form-data").with_params(("boundary", BOUNDARY));
        (content_type, body)
    }

    fn party_fields(name: &str, number: i32, members: &[MemberSpec]) -> Vec<(&'static str, String)> {
        vec![
            ("name", name.to_string()),
            ("number", number.to_string()),
            ("slogan", "Together we can".to_string()),
            ("logoMeaning", "A rising sun".to_string()),
            ("missions", json!(["Better canteen"]).to_string()),
            ("policies", json!(["Longer library hours", "More buses"]).to_string()),
            ("members", serde_json::to_string(members).unwrap()),
        ]
    }

    async fn post_party<'c>(
        client: &'c Client,
        fields: &[(&str, String)],
        files: &[(&str, &[u8])],
    ) -> LocalResponse<'c> {
        let (content_type, body) = multipart(fields, files);
        client
            .post(uri!(create_candidate))
            .header(content_type)
            .body(body)
            .dispatch()
            .await
    }

    async fn put_party<'c>(
        client: &'c Client,
        id: Id,
        fields: &[(&str, String)],
        files: &[(&str, &[u8])],
    ) -> LocalResponse<'c> {
        let (content_type, body) = multipart(fields, files);
        client
            .put(uri!(update_candidate(id)))
            .header(content_type)
            .body(body)
            .dispatch()
            .await
    }

    async fn create_party(client: &Client, number: i32, members: &[MemberSpec]) -> CandidateDesc {
        let response = post_party(client, &party_fields("Blue Wave", number, members), &[]).await;
        assert_eq!(Status::Ok, response.status());
        response.into_json().await.unwrap()
    }

    #[backend_test(admin)]
    async fn create_with_images(client: Client, db: Database) {
        let leader = MemberSpec::example(1, POSITIONS[0]);
        let mut mascot = MemberSpec::example(2, "Mascot");
        mascot.existing_image_url = Some("/images/members/old.jpg".to_string());

        let member_file = format!("memberFiles[{}]", leader.student_id);
        let response = post_party(
            &client,
            &party_fields("Blue  Wave!", 1, &[leader.clone(), mascot.clone()]),
            &[
                ("file", &b"logo bytes"[..]),
                (&member_file, &b"photo bytes"[..]),
            ],
        )
        .await;
        assert_eq!(Status::Ok, response.status());
        let party: CandidateDesc = response.into_json().await.unwrap();

        assert_eq!(party.number, 1);
        assert_eq!(party.policies.len(), 2);
        assert_eq!(party.revision, 0);
        let logo_url = party.logo_url.clone().unwrap();
        assert!(logo_url.starts_with("/images/candidates/logo/Blue_Wave_"));
        assert!(logo_url.ends_with(".jpg"));

        let images: Vec<_> = party.members.iter().map(|m| m.image_url.as_str()).collect();
        assert_eq!(
            images,
            vec!["/images/members/party_1/1.jpg", "/images/members/old.jpg"]
        );

        // The files landed under the configured image root.
        let images = client.rocket().state::<ImageStore>().unwrap();
        let stored = images.public_dir().join("members/party_1/1.jpg");
        assert_eq!(std::fs::read(stored).unwrap(), b"photo bytes");
        let logo = images
            .public_dir()
            .join(logo_url.trim_start_matches("/images/"));
        assert_eq!(std::fs::read(logo).unwrap(), b"logo bytes");

        // And they are listed.
        let response = client.get(uri!(get_candidates)).dispatch().await;
        let listed: Vec<CandidateDesc> = response.into_json().await.unwrap();
        assert_eq!(listed, vec![party]);
        let stored_members = Coll::<Member>::from_db(&db)
            .count_documents(None, None)
            .await
            .unwrap();
        assert_eq!(stored_members, 2);
    }

    #[backend_test(admin)]
    async fn create_rejects_bad_input(client: Client, db: Database) {
        // Missing name.
        let response = post_party(&client, &party_fields(" ", 1, &[]), &[]).await;
        assert_eq!(Status::UnprocessableEntity, response.status());

        // Numbers below -1 mean nothing.
        let response = post_party(&client, &party_fields("Red", -2, &[]), &[]).await;
        assert_eq!(Status::UnprocessableEntity, response.status());

        // The same student twice.
        let member = MemberSpec::example(1, "");
        let response = post_party(
            &client,
            &party_fields("Red", 1, &[member.clone(), member]),
            &[],
        )
        .await;
        assert_eq!(Status::UnprocessableEntity, response.status());

        let count = Coll::<Candidate>::from_db(&db)
            .count_documents(None, None)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[backend_test(admin)]
    async fn create_rejects_duplicates(client: Client, db: Database) {
        let member = MemberSpec::example(1, "");
        create_party(&client, 1, &[member.clone()]).await;

        // Same number.
        let response = post_party(&client, &party_fields("Red", 1, &[]), &[]).await;
        assert_eq!(Status::Conflict, response.status());

        // Same member in another party; the party itself must not be left behind.
        let response = post_party(&client, &party_fields("Red", 2, &[member]), &[]).await;
        assert_eq!(Status::Conflict, response.status());

        let count = Coll::<Candidate>::from_db(&db)
            .count_documents(None, None)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[backend_test(admin)]
    async fn clashing_number_leaves_photos_alone(client: Client) {
        let leader = MemberSpec::example(1, POSITIONS[0]);
        let member_file = format!("memberFiles[{}]", leader.student_id);
        let response = post_party(
            &client,
            &party_fields("Blue Wave", 1, &[leader]),
            &[(&member_file, &b"blue leader"[..])],
        )
        .await;
        assert_eq!(Status::Ok, response.status());

        let images = client.rocket().state::<ImageStore>().unwrap();
        let photo = images.public_dir().join("members/party_1/1.jpg");
        assert_eq!(std::fs::read(&photo).unwrap(), b"blue leader");

        // A new party claiming number 1.
        let rival = MemberSpec::example(2, POSITIONS[0]);
        let rival_file = format!("memberFiles[{}]", rival.student_id);
        let response = post_party(
            &client,
            &party_fields("Red", 1, &[rival.clone()]),
            &[(&rival_file, &b"red leader"[..])],
        )
        .await;
        assert_eq!(Status::Conflict, response.status());
        assert_eq!(std::fs::read(&photo).unwrap(), b"blue leader");

        // An existing party renumbered onto 1.
        let red = create_party(&client, 2, &[rival.clone()]).await;
        let response = put_party(
            &client,
            *red.id,
            &party_fields("Red", 1, &[rival]),
            &[(&rival_file, &b"red leader"[..])],
        )
        .await;
        assert_eq!(Status::Conflict, response.status());
        assert_eq!(std::fs::read(&photo).unwrap(), b"blue leader");

        // Keeping its own number is not a clash.
        let response = put_party(&client, *red.id, &party_fields("Red", 2, &[]), &[]).await;
        assert_eq!(Status::Ok, response.status());
    }

    #[backend_test(admin)]
    async fn update_reconciles_members(client: Client, db: Database) {
        let kept = MemberSpec::example(1, POSITIONS[0]);
        let dropped = MemberSpec::example(2, POSITIONS[1]);
        let party = create_party(&client, 1, &[kept.clone(), dropped]).await;
        let kept_id = party.members[0].id;

        let mut renamed = kept.clone();
        renamed.name = "Renamed Leader".to_string();
        let added = MemberSpec::example(3, POSITIONS[2]);
        let mut fields = party_fields("Blue Wave", 1, &[renamed, added.clone()]);
        fields.push(("revision", "0".to_string()));

        let response = put_party(&client, *party.id, &fields, &[]).await;
        assert_eq!(Status::Ok, response.status());
        let updated: CandidateDesc = response.into_json().await.unwrap();

        assert_eq!(updated.revision, 1);
        assert_eq!(updated.members.len(), 2);
        assert_eq!(updated.members[0].id, kept_id);
        assert_eq!(updated.members[0].name, "Renamed Leader");
        assert_eq!(updated.members[1].student_id, added.student_id);

        let stored_members = Coll::<Member>::from_db(&db)
            .count_documents(None, None)
            .await
            .unwrap();
        assert_eq!(stored_members, 2);

        // Editing from the old revision is refused.
        let response = put_party(&client, *party.id, &fields, &[]).await;
        assert_eq!(Status::Conflict, response.status());

        // Without a revision the edit goes through, and unsent lists are kept.
        let fields = vec![
            ("name", "Blue Wave".to_string()),
            ("number", "1".to_string()),
            ("members", "[]".to_string()),
        ];
        let response = put_party(&client, *party.id, &fields, &[]).await;
        assert_eq!(Status::Ok, response.status());
        let updated: CandidateDesc = response.into_json().await.unwrap();
        assert_eq!(updated.revision, 2);
        assert!(updated.members.is_empty());
        assert_eq!(updated.policies, party.policies);
        assert_eq!(updated.logo_url, party.logo_url);
    }

    #[backend_test(admin)]
    async fn update_unknown_candidate(client: Client) {
        let response = put_party(&client, Id::new(), &party_fields("Red", 1, &[]), &[]).await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test(admin)]
    async fn delete_cascades(client: Client, db: Database) {
        let party = create_party(&client, 1, &[MemberSpec::example(1, "")]).await;
        let other = create_party(&client, 2, &[]).await;

        let voters = (0..30)
            .map(|n| {
                let profile = StudentProfile::example_numbered(n, "Physics", "1", "M");
                let mut voter = NewVoter::new(profile);
                voter.is_voted = true;
                voter.candidate_id = Some(if n < 20 { *party.id } else { *other.id });
                voter
            })
            .collect::<Vec<_>>();
        Coll::<NewVoter>::from_db(&db)
            .insert_many(voters, None)
            .await
            .unwrap();

        let response = client
            .delete(uri!(delete_candidate(*party.id)))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());

        let voters = Coll::<Voter>::from_db(&db);
        let cleared = voters
            .count_documents(doc! { "is_voted": false, "candidate_id": null }, None)
            .await
            .unwrap();
        assert_eq!(cleared, 20);
        let untouched = voters
            .count_documents(doc! { "is_voted": true, "candidate_id": *other.id }, None)
            .await
            .unwrap();
        assert_eq!(untouched, 10);

        let members = Coll::<Member>::from_db(&db)
            .count_documents(None, None)
            .await
            .unwrap();
        assert_eq!(members, 0);
        let remaining = Coll::<Candidate>::from_db(&db)
            .count_documents(None, None)
            .await
            .unwrap();
        assert_eq!(remaining, 1);

        // Already gone.
        let response = client
            .delete(uri!(delete_candidate(*party.id)))
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test(admin)]
    async fn members_listing(client: Client) {
        create_party(&client, 2, &[MemberSpec::example(1, ""), MemberSpec::example(2, "")]).await;
        create_party(&client, 1, &[MemberSpec::example(3, "")]).await;

        let response = client.get(uri!(get_members)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let listing: Vec<MemberListing> = response.into_json().await.unwrap();
        let order: Vec<_> = listing
            .iter()
            .map(|m| (m.candidate.number, m.member.name.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![(1, "Member 3"), (2, "Member 1"), (2, "Member 2")]
        );
        assert_eq!(listing[0].candidate.name, "Blue Wave");
    }

    #[backend_test(admin)]
    async fn roster_import(client: Client, db: Database) {
        let records = (1..=3)
            .map(|n| StudentRecord::example_numbered(n, "Physics", "1", "F"))
            .collect::<Vec<_>>();
        let response = client
            .post(uri!(import_voters))
            .header(ContentType::JSON)
            .body(json!(records).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let summary: RosterImportSummary = response.into_json().await.unwrap();
        assert_eq!(summary, RosterImportSummary { created: 3, updated: 0 });

        // One of them votes before the roster is refreshed.
        let voters = Coll::<Voter>::from_db(&db);
        let first = doc! { "student_id": &records[0].student_id };
        voters
            .update_one(first.clone(), doc! { "$set": { "is_voted": true } }, None)
            .await
            .unwrap();

        let mut refreshed = records.clone();
        refreshed[0].major = "Astronomy".to_string();
        refreshed.push(StudentRecord::example_numbered(4, "Physics", "1", "M"));
        let response = client
            .post(uri!(import_voters))
            .header(ContentType::JSON)
            .body(json!(refreshed).to_string())
            .dispatch()
            .await;
        let summary: RosterImportSummary = response.into_json().await.unwrap();
        assert_eq!(summary, RosterImportSummary { created: 1, updated: 3 });

        let voter = voters.find_one(first, None).await.unwrap().unwrap();
        assert_eq!(voter.profile.major, "Astronomy");
        assert!(voter.is_voted);
        assert_eq!(voters.count_documents(None, None).await.unwrap(), 4);

        // A bad record stops the whole import.
        let mut bad = refreshed.clone();
        bad.push(StudentRecord::example_numbered(5, "Physics", "1", "M"));
        bad[0].name = String::new();
        let response = client
            .post(uri!(import_voters))
            .header(ContentType::JSON)
            .body(json!(bad).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::UnprocessableEntity, response.status());
        assert_eq!(voters.count_documents(None, None).await.unwrap(), 4);
    }

    #[backend_test(voter)]
    async fn voters_cannot_administer(client: Client) {
        let response = client.get(uri!(get_candidates)).dispatch().await;
        assert_eq!(Status::Unauthorized, response.status());

        let response = client.get(uri!(get_members)).dispatch().await;
        assert_eq!(Status::Unauthorized, response.status());

        let response = client
            .post(uri!(import_voters))
            .header(ContentType::JSON)
            .body(json!([VoterLogin::example()]).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Unauthorized, response.status());
    }
}
