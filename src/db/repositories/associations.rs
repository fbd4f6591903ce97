//! Camper <-> activity links through signups.
//!
//! Reads flatten the signup graph into direct lists (one entry per signup, so
//! a camper signed up twice for an activity lists it twice). Writes create the
//! signup row through [`NewSignup::link`] with no hour set.

use anyhow::Result;
use rusqlite::{params, Connection};

use crate::db::{
    models::{
        Activity, ActivityDocument, Camper, CamperDocument, NewSignup, Signup, SignupDocument,
    },
    repositories::{
        activities::{row_to_activity, ACTIVITY_COLUMNS},
        campers::{row_to_camper, CAMPER_COLUMNS},
        ActivityRepository, CamperRepository, SignupOwner, SignupRepository,
    },
    Database,
};

pub struct AssociationRepository<'a> {
    conn: &'a Connection,
}

impl<'a> AssociationRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Activities reachable from a camper's signups. Order is unspecified.
    pub fn activities_for_camper(&self, camper_id: i64) -> Result<Vec<Activity>> {
        CamperRepository::new(self.conn).require(camper_id)?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ACTIVITY_COLUMNS}
             FROM signups
             JOIN activities ON activities.id = signups.activity_id
             WHERE signups.camper_id = ?1
             ORDER BY signups.id"
        ))?;

        let mut rows = stmt.query(params![camper_id])?;
        let mut activities = Vec::new();
        while let Some(row) = rows.next()? {
            activities.push(row_to_activity(row)?);
        }

        Ok(activities)
    }

    /// Campers reachable from an activity's signups. Order is unspecified.
    pub fn campers_for_activity(&self, activity_id: i64) -> Result<Vec<Camper>> {
        ActivityRepository::new(self.conn).require(activity_id)?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CAMPER_COLUMNS}
             FROM signups
             JOIN campers ON campers.id = signups.camper_id
             WHERE signups.activity_id = ?1
             ORDER BY signups.id"
        ))?;

        let mut rows = stmt.query(params![activity_id])?;
        let mut campers = Vec::new();
        while let Some(row) = rows.next()? {
            campers.push(row_to_camper(row)?);
        }

        Ok(campers)
    }

    /// Append `activity_id` to the camper's activities.
    pub fn add_activity_to_camper(&self, camper_id: i64, activity_id: i64) -> Result<Signup> {
        self.link(camper_id, activity_id)
    }

    /// Append `camper_id` to the activity's campers.
    pub fn add_camper_to_activity(&self, activity_id: i64, camper_id: i64) -> Result<Signup> {
        self.link(camper_id, activity_id)
    }

    fn link(&self, camper_id: i64, activity_id: i64) -> Result<Signup> {
        let camper = CamperRepository::new(self.conn).require(camper_id)?;
        let activity = ActivityRepository::new(self.conn).require(activity_id)?;
        SignupRepository::new(self.conn).insert(&NewSignup::link(&camper, &activity))
    }

    pub fn activity_document(&self, activity_id: i64) -> Result<ActivityDocument> {
        let activity = ActivityRepository::new(self.conn).require(activity_id)?;
        let campers = CamperRepository::new(self.conn);

        let signups = SignupRepository::new(self.conn)
            .list_for(SignupOwner::Activity, activity_id)?
            .into_iter()
            .map(|signup| {
                let camper = campers.require(signup.camper_id)?;
                Ok((signup, camper))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ActivityDocument::assemble(&activity, &signups))
    }

    pub fn camper_document(&self, camper_id: i64) -> Result<CamperDocument> {
        let camper = CamperRepository::new(self.conn).require(camper_id)?;
        let activities = ActivityRepository::new(self.conn);

        let signups = SignupRepository::new(self.conn)
            .list_for(SignupOwner::Camper, camper_id)?
            .into_iter()
            .map(|signup| {
                let activity = activities.require(signup.activity_id)?;
                Ok((signup, activity))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CamperDocument::assemble(&camper, &signups))
    }

    pub fn signup_document(&self, signup_id: i64) -> Result<SignupDocument> {
        let signup = SignupRepository::new(self.conn).require(signup_id)?;
        let camper = CamperRepository::new(self.conn).require(signup.camper_id)?;
        let activity = ActivityRepository::new(self.conn).require(signup.activity_id)?;
        Ok(SignupDocument::assemble(&signup, &camper, &activity))
    }
}

impl Database {
    pub async fn camper_activities(&self, camper_id: i64) -> Result<Vec<Activity>> {
        self.execute(move |conn| AssociationRepository::new(conn).activities_for_camper(camper_id))
            .await
    }

    pub async fn activity_campers(&self, activity_id: i64) -> Result<Vec<Camper>> {
        self.execute(move |conn| {
            AssociationRepository::new(conn).campers_for_activity(activity_id)
        })
        .await
    }

    pub async fn add_activity_to_camper(&self, camper_id: i64, activity_id: i64) -> Result<Signup> {
        self.transact(move |tx| {
            AssociationRepository::new(tx).add_activity_to_camper(camper_id, activity_id)
        })
        .await
    }

    pub async fn add_camper_to_activity(&self, activity_id: i64, camper_id: i64) -> Result<Signup> {
        self.transact(move |tx| {
            AssociationRepository::new(tx).add_camper_to_activity(activity_id, camper_id)
        })
        .await
    }

    pub async fn activity_document(&self, activity_id: i64) -> Result<ActivityDocument> {
        self.execute(move |conn| AssociationRepository::new(conn).activity_document(activity_id))
            .await
    }

    pub async fn camper_document(&self, camper_id: i64) -> Result<CamperDocument> {
        self.execute(move |conn| AssociationRepository::new(conn).camper_document(camper_id))
            .await
    }

    pub async fn signup_document(&self, signup_id: i64) -> Result<SignupDocument> {
        self.execute(move |conn| AssociationRepository::new(conn).signup_document(signup_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{DeletePolicy, StoreConfig},
        db::{
            models::{NewActivity, NewCamper, SignupInput},
            repositories::test_connection,
            StoreError,
        },
    };

    fn seed(conn: &Connection) -> (Camper, Activity) {
        let camper = CamperRepository::new(conn)
            .insert(&NewCamper::new("Alex", 12))
            .unwrap();
        let activity = ActivityRepository::new(conn)
            .insert(&NewActivity {
                name: Some("Canoeing".into()),
                difficulty: Some(3),
            })
            .unwrap();
        (camper, activity)
    }

    #[test]
    fn direct_signup_is_visible_from_both_sides() {
        let conn = test_connection();
        let (camper, activity) = seed(&conn);
        SignupRepository::new(&conn)
            .insert(&NewSignup::at_hour(camper.id, activity.id, 9))
            .unwrap();

        let links = AssociationRepository::new(&conn);
        assert_eq!(links.activities_for_camper(camper.id).unwrap(), vec![activity.clone()]);
        assert_eq!(links.campers_for_activity(activity.id).unwrap(), vec![camper]);
    }

    #[test]
    fn appending_activity_creates_one_unscheduled_signup() {
        let conn = test_connection();
        let (camper, activity) = seed(&conn);
        let links = AssociationRepository::new(&conn);

        let signup = links.add_activity_to_camper(camper.id, activity.id).unwrap();
        assert_eq!(signup.camper_id, camper.id);
        assert_eq!(signup.activity_id, activity.id);
        assert_eq!(signup.time, None);

        let all = SignupRepository::new(&conn).list().unwrap();
        assert_eq!(all, vec![signup]);
        assert_eq!(links.campers_for_activity(activity.id).unwrap(), vec![camper]);
    }

    #[test]
    fn appending_camper_fills_both_foreign_keys() {
        let conn = test_connection();
        let (camper, activity) = seed(&conn);
        let links = AssociationRepository::new(&conn);

        let signup = links.add_camper_to_activity(activity.id, camper.id).unwrap();
        assert_eq!((signup.camper_id, signup.activity_id, signup.time), (camper.id, activity.id, None));
        assert_eq!(links.activities_for_camper(camper.id).unwrap(), vec![activity]);
    }

    #[test]
    fn linking_unknown_rows_is_not_found() {
        let conn = test_connection();
        let (camper, _) = seed(&conn);

        let err = AssociationRepository::new(&conn)
            .add_activity_to_camper(camper.id, 77)
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::NotFound {
                entity: "activity",
                id: 77
            })
        );
        assert!(SignupRepository::new(&conn).list().unwrap().is_empty());
    }

    #[test]
    fn documents_terminate_and_carry_links() {
        let conn = test_connection();
        let (camper, activity) = seed(&conn);
        let links = AssociationRepository::new(&conn);
        let signup = SignupRepository::new(&conn)
            .insert(&NewSignup::at_hour(camper.id, activity.id, 9))
            .unwrap();

        let activity_doc = links.activity_document(activity.id).unwrap();
        assert_eq!(activity_doc.campers.len(), 1);
        assert_eq!(activity_doc.signups[0].camper.name, "Alex");

        let camper_doc = links.camper_document(camper.id).unwrap();
        assert_eq!(camper_doc.activities[0].name.as_deref(), Some("Canoeing"));

        let signup_doc = links.signup_document(signup.id).unwrap();
        assert_eq!(
            signup_doc.to_string(),
            format!("Signup: {}, Time: 9, Activity: Canoeing, Camper: Alex", signup.id)
        );

        let json = serde_json::to_value(&signup_doc).unwrap();
        assert!(json["camper"].get("signups").is_none());
        assert!(json["activity"].get("signups").is_none());
    }

    #[tokio::test]
    async fn database_facade_end_to_end() {
        let db = Database::in_memory().unwrap();
        let camper = db.create_camper(NewCamper::new("Alex", 12)).await.unwrap();
        let activity = db
            .create_activity(NewActivity {
                name: Some("Archery".into()),
                difficulty: Some(2),
            })
            .await
            .unwrap();

        let scheduled = db
            .create_signup(SignupInput {
                camper_id: camper.id,
                activity_id: activity.id,
                time: 9,
            })
            .await
            .unwrap();
        assert_eq!(scheduled.time, Some(9));

        let linked = db.add_activity_to_camper(camper.id, activity.id).await.unwrap();
        assert_eq!(linked.time, None);

        assert_eq!(db.camper_activities(camper.id).await.unwrap().len(), 2);
        assert_eq!(db.activity_campers(activity.id).await.unwrap().len(), 2);

        let removed = db.delete_camper(camper.id).await.unwrap();
        assert_eq!(removed, 2);
        assert!(db.list_signups().await.unwrap().is_empty());
        assert_eq!(db.list_activities().await.unwrap(), vec![activity]);
    }

    #[tokio::test]
    async fn restrict_policy_keeps_rows_with_signups() {
        let db = Database::open(&StoreConfig {
            database_path: ":memory:".into(),
            delete_policy: DeletePolicy::Restrict,
            ..StoreConfig::default()
        })
        .unwrap();
        let camper = db.create_camper(NewCamper::new("Sam", 9)).await.unwrap();
        let activity = db.create_activity(NewActivity::default()).await.unwrap();
        db.add_camper_to_activity(activity.id, camper.id).await.unwrap();

        let err = db.delete_activity(activity.id).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::InUse { signups: 1, .. })
        ));
        assert!(db.get_activity(activity.id).await.unwrap().is_some());
        assert_eq!(db.list_signups().await.unwrap().len(), 1);
    }
}
