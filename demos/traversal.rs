use avl_tree::{AvlTree, Order};

fn main() {
    let tree: AvlTree<i32, String> = (1..=7).map(|k| (k, k.to_string())).collect();

    for order in [Order::InOrder, Order::PreOrder, Order::PostOrder] {
        println!("{order:?} traversal:");
        for node in tree.nodes(order) {
            println!("  {node} (height {})", node.height());
        }
    }

    println!("Tree:");
    print!("{}", tree.pretty());
}
