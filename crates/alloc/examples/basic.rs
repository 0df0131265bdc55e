use simple_vector::DynamicArray;

fn main() {
    let mut arr = DynamicArray::new();

    for value in [1, 2] {
        arr.push(value);
        println!("pushed {value}: len {}, capacity {}", arr.len(), arr.capacity());
    }

    let cursor = arr.insert(arr.begin() + 1, 9);
    println!("inserted {} at {}: {:?}", arr[cursor.offset()], cursor.offset(), arr);

    arr.erase(arr.begin());
    println!("erased the front: {:?}", arr);

    match arr.at(5) {
        Ok(value) => println!("at(5) = {value}"),
        Err(err) => println!("at(5) failed: {err}"),
    }
}
