use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        Self {
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("storage/data")),
        }
    }

    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join("users.json")
    }

    pub fn students_path(&self) -> PathBuf {
        self.data_dir.join("students.json")
    }

    pub fn teachers_path(&self) -> PathBuf {
        self.data_dir.join("teachers.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_paths() {
        let config = StorageConfig {
            data_dir: PathBuf::from("/tmp/school"),
        };
        assert_eq!(config.users_path(), PathBuf::from("/tmp/school/users.json"));
        assert_eq!(
            config.students_path(),
            PathBuf::from("/tmp/school/students.json")
        );
        assert_eq!(
            config.teachers_path(),
            PathBuf::from("/tmp/school/teachers.json")
        );
    }
}
