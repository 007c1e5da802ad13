//! Ordered callback chains run by the album around saves and queries.

use crate::models::{Picture, QueryArgs};

/// Transforms a text field before it is saved; the second argument is the picture id
pub type FieldFilter = Box<dyn Fn(String, Option<i64>) -> String + Send + Sync>;
/// Observes a picture around a save
pub type PictureObserver = Box<dyn Fn(&Picture) + Send + Sync>;
/// Rewrites merged query options before the SQL is built
pub type QueryArgsFilter = Box<dyn Fn(QueryArgs) -> QueryArgs + Send + Sync>;

#[derive(Default)]
pub struct AlbumHooks {
    title_before_save: Vec<FieldFilter>,
    description_before_save: Vec<FieldFilter>,
    before_save: Vec<PictureObserver>,
    after_save: Vec<PictureObserver>,
    query_args: Vec<QueryArgsFilter>,
}

impl std::fmt::Debug for AlbumHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlbumHooks")
            .field("title_before_save", &self.title_before_save.len())
            .field("description_before_save", &self.description_before_save.len())
            .field("before_save", &self.before_save.len())
            .field("after_save", &self.after_save.len())
            .field("query_args", &self.query_args.len())
            .finish()
    }
}

impl AlbumHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_title_before_save<F>(&mut self, filter: F) -> &mut Self
    where
        F: Fn(String, Option<i64>) -> String + Send + Sync + 'static,
    {
        self.title_before_save.push(Box::new(filter));
        self
    }

    pub fn on_description_before_save<F>(&mut self, filter: F) -> &mut Self
    where
        F: Fn(String, Option<i64>) -> String + Send + Sync + 'static,
    {
        self.description_before_save.push(Box::new(filter));
        self
    }

    pub fn on_before_save<F>(&mut self, observer: F) -> &mut Self
    where
        F: Fn(&Picture) + Send + Sync + 'static,
    {
        self.before_save.push(Box::new(observer));
        self
    }

    pub fn on_after_save<F>(&mut self, observer: F) -> &mut Self
    where
        F: Fn(&Picture) + Send + Sync + 'static,
    {
        self.after_save.push(Box::new(observer));
        self
    }

    pub fn on_query_args<F>(&mut self, filter: F) -> &mut Self
    where
        F: Fn(QueryArgs) -> QueryArgs + Send + Sync + 'static,
    {
        self.query_args.push(Box::new(filter));
        self
    }

    pub(crate) fn filter_title(&self, title: String, id: Option<i64>) -> String {
        self.title_before_save
            .iter()
            .fold(title, |value, filter| filter(value, id))
    }

    pub(crate) fn filter_description(&self, description: String, id: Option<i64>) -> String {
        self.description_before_save
            .iter()
            .fold(description, |value, filter| filter(value, id))
    }

    pub(crate) fn notify_before_save(&self, picture: &Picture) {
        for observer in &self.before_save {
            observer(picture);
        }
    }

    pub(crate) fn notify_after_save(&self, picture: &Picture) {
        for observer in &self.after_save {
            observer(picture);
        }
    }

    pub(crate) fn filter_query_args(&self, args: QueryArgs) -> QueryArgs {
        self.query_args.iter().fold(args, |args, filter| filter(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_filters_run_in_registration_order() {
        let mut hooks = AlbumHooks::new();
        hooks
            .on_title_before_save(|t, _| format!("{}-a", t))
            .on_title_before_save(|t, _| format!("{}-b", t));
        assert_eq!(hooks.filter_title("x".to_string(), None), "x-a-b");
    }

    #[test]
    fn test_description_filter_sees_id() {
        let mut hooks = AlbumHooks::new();
        hooks.on_description_before_save(|d, id| format!("{}#{}", d, id.unwrap_or(0)));
        assert_eq!(hooks.filter_description("d".to_string(), Some(9)), "d#9");
    }

    #[test]
    fn test_observers_are_called() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut hooks = AlbumHooks::new();
        let sink = seen.clone();
        hooks.on_after_save(move |p| sink.lock().unwrap().push(p.owner_id));
        hooks.notify_after_save(&Picture::for_user(3));
        hooks.notify_before_save(&Picture::for_user(4));
        assert_eq!(*seen.lock().unwrap(), vec![Some(3)]);
    }

    #[test]
    fn test_query_args_filter() {
        let mut hooks = AlbumHooks::new();
        hooks.on_query_args(|mut args| {
            args.per_page = Some(3);
            args
        });
        let args = hooks.filter_query_args(QueryArgs::default());
        assert_eq!(args.per_page, Some(3));
    }
}
