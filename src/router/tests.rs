//! Tests for the path tree and router.

#[cfg(test)]
mod router_tests {
    use crate::parser::Method;
    use crate::router::{PathTree, Router};

    #[test]
    fn test_empty_tree_has_no_matches() {
        let tree: PathTree<u32> = PathTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.get("/"), None);
        assert_eq!(tree.get(""), None);
    }

    #[test]
    fn test_first_insert_sets_root() {
        let mut tree = PathTree::new();
        tree.add("/ping", 1);
        assert_eq!(tree.root().key(), "/ping");
        assert_eq!(tree.root().leaf(), Some(&1));
        assert_eq!(tree.get("/ping"), Some(&1));
    }

    #[test]
    fn test_round_trip_in_any_order() {
        let paths = [
            "/",
            "/users",
            "/users/list",
            "/posts",
            "/post",
            "/api/v1/health",
            "/api/v2/health",
            "/about",
        ];

        for rotation in 0..paths.len() {
            let mut tree = PathTree::new();
            let mut order: Vec<(usize, &str)> = paths.iter().copied().enumerate().collect();
            order.rotate_left(rotation);
            for (value, path) in &order {
                tree.add(path, *value);
            }
            for (value, path) in paths.iter().enumerate() {
                assert_eq!(tree.get(path), Some(&value), "rotation {rotation}, path {path}");
            }
            assert_eq!(tree.len(), paths.len());
        }

        let mut reversed = PathTree::new();
        for (value, path) in paths.iter().enumerate().rev() {
            reversed.add(path, value);
        }
        for (value, path) in paths.iter().enumerate() {
            assert_eq!(reversed.get(path), Some(&value));
        }
    }

    #[test]
    fn test_prefix_splitting() {
        let mut tree = PathTree::new();
        tree.add("/users", "users");
        tree.add("/user", "user");
        tree.add("/use", "use");

        assert_eq!(tree.get("/users"), Some(&"users"));
        assert_eq!(tree.get("/user"), Some(&"user"));
        assert_eq!(tree.get("/use"), Some(&"use"));
        assert_eq!(tree.get("/us"), None);
        assert_eq!(tree.get("/usersx"), None);

        // "/use" -> "r" -> "s"
        assert_eq!(tree.root().key(), "/use");
        assert_eq!(tree.root().children().len(), 1);
        assert_eq!(tree.root().children()[0].key(), "r");
    }

    #[test]
    fn test_prefix_splitting_reverse_order() {
        let mut tree = PathTree::new();
        tree.add("/use", "use");
        tree.add("/user", "user");
        tree.add("/users", "users");

        assert_eq!(tree.get("/users"), Some(&"users"));
        assert_eq!(tree.get("/user"), Some(&"user"));
        assert_eq!(tree.get("/use"), Some(&"use"));
        assert_eq!(tree.get("/us"), None);
    }

    #[test]
    fn test_split_in_the_middle_of_an_edge() {
        let mut tree = PathTree::new();
        tree.add("/contact", 1);
        tree.add("/company", 2);

        let root = tree.root();
        assert_eq!(root.key(), "/co");
        assert!(root.leaf().is_none());
        let keys: Vec<&str> = root.children().iter().map(|c| c.key()).collect();
        assert_eq!(keys, vec!["ntact", "mpany"]);

        assert_eq!(tree.get("/contact"), Some(&1));
        assert_eq!(tree.get("/company"), Some(&2));
        assert_eq!(tree.get("/co"), None);
        assert_eq!(tree.get("/comp"), None);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut tree = PathTree::new();
        tree.add("/Foo", 7);
        assert_eq!(tree.get("/foo"), Some(&7));
        assert_eq!(tree.get("/Foo"), Some(&7));
        assert_eq!(tree.get("/FOO"), Some(&7));
    }

    #[test]
    fn test_last_registration_wins() {
        let mut tree = PathTree::new();
        assert_eq!(tree.add("/dup", 1), None);
        assert_eq!(tree.add("/dup", 2), Some(1));
        assert_eq!(tree.get("/dup"), Some(&2));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_non_ascii_paths_split_on_char_boundaries() {
        let mut tree = PathTree::new();
        tree.add("/café", 1);
        tree.add("/cafè", 2);
        assert_eq!(tree.get("/café"), Some(&1));
        assert_eq!(tree.get("/cafè"), Some(&2));
        assert_eq!(tree.get("/caf"), None);
    }

    #[test]
    fn test_entries_lists_full_paths() {
        let mut tree = PathTree::new();
        tree.add("/b", 2);
        tree.add("/a", 1);
        tree.add("/ab", 3);

        let mut entries: Vec<(String, i32)> =
            tree.entries().into_iter().map(|(p, v)| (p, *v)).collect();
        entries.sort();
        assert_eq!(
            entries,
            vec![("/a".to_string(), 1), ("/ab".to_string(), 3), ("/b".to_string(), 2)]
        );
    }

    #[test]
    fn test_router_separates_methods() {
        let mut router = Router::new();
        router.add(Method::GET, "/items", "list");
        router.add(Method::POST, "/items", "create");

        assert_eq!(router.find(Method::GET, "/items"), Some(&"list"));
        assert_eq!(router.find(Method::POST, "/items"), Some(&"create"));
        assert_eq!(router.find(Method::DELETE, "/items"), None);
        assert!(router.tree(Method::DELETE).is_none());
        assert_eq!(router.len(), 2);
    }

    #[test]
    fn test_router_reports_replaced_handler() {
        let mut router = Router::new();
        assert_eq!(router.add(Method::GET, "/x", 1), None);
        assert_eq!(router.add(Method::GET, "/x", 2), Some(1));
        assert_eq!(router.find(Method::GET, "/x"), Some(&2));
    }

    #[test]
    fn test_router_routes_are_sorted() {
        let mut router = Router::new();
        router.add(Method::POST, "/b", ());
        router.add(Method::GET, "/z", ());
        router.add(Method::GET, "/a", ());

        assert_eq!(
            router.routes(),
            vec![
                (Method::GET, "/a".to_string()),
                (Method::GET, "/z".to_string()),
                (Method::POST, "/b".to_string()),
            ]
        );
    }
}
