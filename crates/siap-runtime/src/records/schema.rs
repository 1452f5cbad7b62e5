//! Per-resource record schemas.
//!
//! | Resource | Collection | Id | Attachments |
//! |----------|------------|----|-------------|
//! | Workers | `artifacts/{app}/users` | field `id` | photo, sik, licenses[] |
//! | Assets | `artifacts/{app}/assets` | auto | image |
//! | OnCall | `artifacts/{app}/oncall` | auto | dokumentasiUrl |
//! | Routine | `artifacts/{app}/routine` | auto | dokumentasi |
//! | Users | `users` | auto | - |

use super::field::FieldKind;
use siap_auth::Resource;
use siap_types::{CollectionPath, DocId, PathError, TryNew};

/// Where a collection lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Under the application's artifact namespace, `artifacts/{app_id}/<name>`.
    Scoped(&'static str),
    /// At the top level.
    Root(&'static str),
}

/// How document ids are assigned on create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdStrategy {
    Auto,
    /// Taken from the value of a form field, which cannot change afterwards.
    FromField(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

/// Blob key layout for an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobNaming {
    /// `<dir>/<unix millis>-<file name>`
    Timestamped { dir: &'static str },
    /// `<dir>/<record id>/<sub>/<file name>`
    PerRecord {
        dir: &'static str,
        sub: &'static str,
    },
}

impl BlobNaming {
    /// Blob key for one uploaded file.
    #[must_use]
    pub fn key(self, id: &DocId, millis: i64, file_name: &str) -> String {
        match self {
            Self::Timestamped { dir } => format!("{dir}/{millis}-{file_name}"),
            Self::PerRecord { dir, sub } => format!("{dir}/{id}/{sub}/{file_name}"),
        }
    }
}

/// A file field whose stored value is the blob URL (or a list of URLs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentSpec {
    pub field: &'static str,
    pub multiple: bool,
    pub naming: BlobNaming,
}

/// Shape of one record resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub resource: Resource,
    pub location: Location,
    pub id: IdStrategy,
    pub fields: &'static [FieldSpec],
    pub attachments: &'static [AttachmentSpec],
    /// Field shown as the record's label in listings.
    pub title: &'static str,
}

impl Schema {
    /// Schema for a resource, if it holds records.
    #[must_use]
    pub fn for_resource(resource: Resource) -> Option<&'static Schema> {
        SCHEMAS.iter().copied().find(|s| s.resource == resource)
    }

    /// Collection path for the given application namespace.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] if `app_id` is not a valid path segment.
    pub fn collection(&self, app_id: &str) -> Result<CollectionPath, PathError> {
        let segments = match self.location {
            Location::Scoped(name) => vec!["artifacts".to_string(), app_id.to_string(), name.to_string()],
            Location::Root(name) => vec![name.to_string()],
        };
        CollectionPath::try_new(segments)
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn attachment(&self, name: &str) -> Option<&'static AttachmentSpec> {
        self.attachments.iter().find(|a| a.field == name)
    }
}

const fn text(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Text,
        required: false,
    }
}

const fn number(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Number,
        required: false,
    }
}

const fn single(field: &'static str, dir: &'static str) -> AttachmentSpec {
    AttachmentSpec {
        field,
        multiple: false,
        naming: BlobNaming::Timestamped { dir },
    }
}

pub static WORKERS: Schema = Schema {
    resource: Resource::Workers,
    location: Location::Scoped("users"),
    id: IdStrategy::FromField("id"),
    fields: &[
        FieldSpec {
            name: "id",
            kind: FieldKind::Number,
            required: true,
        },
        FieldSpec {
            name: "name",
            kind: FieldKind::Text,
            required: true,
        },
        number("age"),
        text("area"),
        text("contractor"),
        number("point_reward"),
        text("position"),
        text("punishment"),
    ],
    attachments: &[
        AttachmentSpec {
            field: "photo",
            multiple: false,
            naming: BlobNaming::PerRecord {
                dir: "workers",
                sub: "photo",
            },
        },
        AttachmentSpec {
            field: "sik",
            multiple: false,
            naming: BlobNaming::PerRecord {
                dir: "workers",
                sub: "sik",
            },
        },
        AttachmentSpec {
            field: "licenses",
            multiple: true,
            naming: BlobNaming::PerRecord {
                dir: "workers",
                sub: "licenses",
            },
        },
    ],
    title: "name",
};

pub static ASSETS: Schema = Schema {
    resource: Resource::Assets,
    location: Location::Scoped("assets"),
    id: IdStrategy::Auto,
    fields: &[
        text("address"),
        FieldSpec {
            name: "assets",
            kind: FieldKind::Text,
            required: true,
        },
        text("condition"),
        text("facility"),
        text("floor"),
        FieldSpec {
            name: "initial_date",
            kind: FieldKind::Date,
            required: false,
        },
        FieldSpec {
            name: "last_maintenance",
            kind: FieldKind::Date,
            required: false,
        },
        FieldSpec {
            name: "last_replace_part",
            kind: FieldKind::Date,
            required: false,
        },
        text("latitude"),
        text("longitude"),
        text("merk"),
        text("technical_data"),
    ],
    attachments: &[single("image", "assets")],
    title: "assets",
};

pub static ONCALL: Schema = Schema {
    resource: Resource::OnCall,
    location: Location::Scoped("oncall"),
    id: IdStrategy::Auto,
    fields: &[
        FieldSpec {
            name: "tanggal",
            kind: FieldKind::Timestamp,
            required: true,
        },
        text("group"),
        text("location"),
        text("shift"),
        text("departement"),
        text("catatan"),
    ],
    attachments: &[single("dokumentasiUrl", "oncall")],
    title: "location",
};

pub static ROUTINE: Schema = Schema {
    resource: Resource::Routine,
    location: Location::Scoped("routine"),
    id: IdStrategy::Auto,
    fields: &[
        FieldSpec {
            name: "jalan_tol",
            kind: FieldKind::Text,
            required: true,
        },
        text("indikator"),
        text("lokasi"),
        text("jalur"),
        text("lajur"),
        text("latitude"),
        text("longitude"),
        text("akurasi"),
        text("deskripsi"),
        text("catatan"),
    ],
    attachments: &[single("dokumentasi", "routine")],
    title: "jalan_tol",
};

pub static USERS: Schema = Schema {
    resource: Resource::Users,
    location: Location::Root("users"),
    id: IdStrategy::Auto,
    fields: &[
        FieldSpec {
            name: "username",
            kind: FieldKind::Text,
            required: true,
        },
        FieldSpec {
            name: "email",
            kind: FieldKind::Text,
            required: true,
        },
        FieldSpec {
            name: "role",
            kind: FieldKind::Text,
            required: true,
        },
    ],
    attachments: &[],
    title: "username",
};

/// Every record schema, in navigation order.
pub static SCHEMAS: [&Schema; 5] = [&ONCALL, &ROUTINE, &WORKERS, &ASSETS, &USERS];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_record_resource_has_a_schema() {
        for resource in Resource::ALL {
            assert_eq!(
                Schema::for_resource(resource).is_some(),
                resource.has_records(),
                "{resource}"
            );
        }
    }

    #[test]
    fn collection_paths() {
        assert_eq!(
            WORKERS.collection("Ij8HEOktiALS0zjKB3ay").unwrap().to_string(),
            "artifacts/Ij8HEOktiALS0zjKB3ay/users"
        );
        assert_eq!(USERS.collection("ignored").unwrap().to_string(), "users");
        assert!(ASSETS.collection("bad/app").is_err());
    }

    #[test]
    fn blob_keys() {
        let id = DocId::try_new("1042".to_string()).unwrap();
        let per_record = WORKERS.attachment("licenses").unwrap().naming;
        assert_eq!(
            per_record.key(&id, 0, "k3.pdf"),
            "workers/1042/licenses/k3.pdf"
        );
        let stamped = ASSETS.attachment("image").unwrap().naming;
        assert_eq!(stamped.key(&id, 1_700_000_000_000, "a.jpg"), "assets/1700000000000-a.jpg");
    }

    #[test]
    fn id_field_is_a_required_field() {
        for schema in SCHEMAS {
            if let IdStrategy::FromField(name) = schema.id {
                assert!(schema.field(name).is_some_and(|f| f.required));
            }
            for attachment in schema.attachments {
                assert!(schema.field(attachment.field).is_none());
            }
        }
    }
}
