use avl_tree::{AvlTree, Error};

fn main() -> Result<(), Error> {
    let mut tree: AvlTree<i32, &str> = AvlTree::new();
    tree.insert(0, "zero")?;
    tree.insert(1, "one")?;
    tree.insert(2, "two")?;
    assert!(!tree.insert(2, "deux")?);
    tree.insert(3, "three")?;
    tree.insert(4, "four")?;
    tree.insert(5, "five")?;
    assert_eq!(tree.find(&1)?, Some(&"one"));
    tree.delete(&1)?;
    assert_eq!(tree.find(&1)?, None);

    if let Err(err) = tree.insert(None, "nothing") {
        println!("rejected: {err}");
    }

    for (k, v) in &tree {
        println!("{k} => {v}");
    }
    println!("size: {}, height: {}", tree.size(), tree.height());
    Ok(())
}
